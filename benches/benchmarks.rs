use codspeed_criterion_compat::{Criterion, black_box, criterion_group, criterion_main};
use quotient::{Int128, Rational};

// ============================================================================
// 128-bit Integer Benchmarks
// ============================================================================

fn bench_mul_32_32(c: &mut Criterion) {
    let a = Int128::from(5000i64);
    let b = Int128::from(1250i64);
    c.bench_function("int128 mul 32x32", |bench| {
        bench.iter(|| black_box(a.mul(&b).unwrap()))
    });
}

fn bench_mul_64_64(c: &mut Criterion) {
    let a = Int128::from(0x1234_5678_9ABCu64);
    let b = Int128::from(0xFEDC_BA98_7654u64);
    c.bench_function("int128 mul 64x64", |bench| {
        bench.iter(|| black_box(a.mul(&b).unwrap()))
    });
}

fn bench_mul_32_128(c: &mut Criterion) {
    let a = Int128::from(7i64);
    let b = Int128::from(1i128 << 100);
    c.bench_function("int128 mul 32x128", |bench| {
        bench.iter(|| black_box(a.mul(&b).unwrap()))
    });
}

fn bench_mul_64_96(c: &mut Criterion) {
    let a = Int128::from(1u64 << 40);
    let b = Int128::from(1i128 << 75);
    c.bench_function("int128 mul 64x96", |bench| {
        bench.iter(|| black_box(a.mul(&b).unwrap()))
    });
}

fn bench_shift_subtract_division(c: &mut Criterion) {
    let a = Int128::MAX;
    let b = Int128::from(1_000_000_007i64);
    c.bench_function("int128 div_rem full width", |bench| {
        bench.iter(|| black_box(a.div_rem(&b).unwrap()))
    });
}

fn bench_radix_round_trip(c: &mut Criterion) {
    let v = Int128::MAX;
    c.bench_function("int128 decimal render + parse", |bench| {
        bench.iter(|| {
            let text = v.to_string();
            black_box(text.parse::<Int128>().unwrap())
        })
    });
}

// ============================================================================
// Rational Benchmarks
// ============================================================================

fn bench_rational_add_chain(c: &mut Criterion) {
    let terms: Vec<Rational> = (1..50)
        .map(|n| Rational::new(1, n).unwrap())
        .collect();
    c.bench_function("rational 49-term harmonic sum", |bench| {
        bench.iter(|| {
            let mut sum = Rational::ZERO;
            for t in &terms {
                sum = sum.add(t).unwrap();
            }
            black_box(sum)
        })
    });
}

fn bench_rational_mul(c: &mut Criterion) {
    let a = Rational::new(355, 113).unwrap();
    let b = Rational::new(-22, 7).unwrap();
    c.bench_function("rational mul", |bench| {
        bench.iter(|| black_box(a.mul(&b).unwrap()))
    });
}

fn bench_rational_pow(c: &mut Criterion) {
    let base = Rational::new(3, 2).unwrap();
    c.bench_function("rational pow 200", |bench| {
        bench.iter(|| black_box(base.pow(200).unwrap()))
    });
}

// ============================================================================
// Series Benchmarks
// ============================================================================

fn bench_exp(c: &mut Criterion) {
    let x = Rational::ONE;
    c.bench_function("series exp(1)", |bench| {
        bench.iter(|| black_box(x.exp().unwrap()))
    });
}

fn bench_ln(c: &mut Criterion) {
    let x = Rational::new(1_000_000, 7).unwrap();
    c.bench_function("series ln(1e6/7)", |bench| {
        bench.iter(|| black_box(x.ln().unwrap()))
    });
}

fn bench_sin(c: &mut Criterion) {
    let x = Rational::new(100, 1).unwrap();
    c.bench_function("series sin(100) with reduction", |bench| {
        bench.iter(|| black_box(x.sin().unwrap()))
    });
}

criterion_group!(
    benches,
    bench_mul_32_32,
    bench_mul_64_64,
    bench_mul_32_128,
    bench_mul_64_96,
    bench_shift_subtract_division,
    bench_radix_round_trip,
    bench_rational_add_chain,
    bench_rational_mul,
    bench_rational_pow,
    bench_exp,
    bench_ln,
    bench_sin,
);
criterion_main!(benches);
