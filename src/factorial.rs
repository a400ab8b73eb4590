//! Process-wide factorial cache.

use std::sync::RwLock;

use once_cell::sync::Lazy;

use crate::error::{NumericError, NumericResult};
use crate::int128::Int128;

/// Append-only cache of `0!..n!`.
///
/// The table grows lazily under the write lock, never shrinks and is never
/// invalidated, so readers always see a consistent prefix. The cache is an
/// explicit object rather than hidden module state: series evaluation takes
/// whichever instance it is handed, and the process-wide default lives
/// behind [`shared`].
pub struct FactorialCache {
    table: RwLock<Vec<Int128>>,
}

impl FactorialCache {
    pub fn new() -> FactorialCache {
        FactorialCache {
            table: RwLock::new(vec![Int128::ONE, Int128::ONE]),
        }
    }

    /// `n!`, or an overflow error past the largest 128-bit factorial (33!).
    pub fn factorial(&self, n: u32) -> NumericResult<Int128> {
        self.checked(n).ok_or_else(|| {
            NumericError::overflow(format!("factorial({n}) exceeds the 128-bit range"))
        })
    }

    /// `n!` as an option; `None` marks the value as out of range. Series
    /// term generators use this as their convergence sentinel.
    pub fn checked(&self, n: u32) -> Option<Int128> {
        let idx = n as usize;
        {
            let table = self.table.read().unwrap();
            if idx < table.len() {
                return Some(table[idx]);
            }
        }
        let mut table = self.table.write().unwrap();
        while table.len() <= idx {
            let k = table.len();
            let last = table[k - 1];
            match last.mul(&Int128::from(k as i64)) {
                Ok(next) => table.push(next),
                Err(_) => return None,
            }
        }
        Some(table[idx])
    }
}

impl Default for FactorialCache {
    fn default() -> Self {
        Self::new()
    }
}

static SHARED: Lazy<FactorialCache> = Lazy::new(FactorialCache::new);

/// The process-wide cache.
pub fn shared() -> &'static FactorialCache {
    &SHARED
}

/// `n!` from the process-wide cache.
pub fn factorial(n: u32) -> NumericResult<Int128> {
    shared().factorial(n)
}

pub(crate) fn checked(n: u32) -> Option<Int128> {
    shared().checked(n)
}
