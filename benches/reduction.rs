use criterion::{criterion_group, criterion_main, Criterion};
use homomod::impls::numbers::{compare_less_than, subtract};
use homomod::prelude::*;

fn criterion_cipher(c: &mut Criterion) {
    let scheme = Gf2Scheme::generate(Parameters::new(256, 32, 1, 32).unwrap()).unwrap();

    // Note that the number doesn't matter, the benchmark won't change
    let n: u64 = 5;

    let mut c1 = None;
    c.bench_function("encrypt", |b| {
        b.iter(|| c1 = Some(EncryptedBinaryNumber::encrypt(&scheme, &[n], 4).unwrap()))
    });
    let c1 = c1.unwrap();

    let mut d = Vec::new();
    c.bench_function("decrypt", |b| b.iter(|| d = c1.decrypt(&scheme).unwrap()));

    assert_eq!(vec![n], d);
}

fn criterion_primitives(c: &mut Criterion) {
    let scheme = Gf2Scheme::generate(Parameters::new(256, 32, 1, 32).unwrap()).unwrap();
    let a = EncryptedBinaryNumber::encrypt(&scheme, &[6], 4).unwrap();
    let m = EncryptedBinaryNumber::encrypt(&scheme, &[5], 4).unwrap();

    c.bench_function("subtract", |b| b.iter(|| subtract(&a, &m).unwrap()));
    c.bench_function("compare", |b| b.iter(|| compare_less_than(&a, &m).unwrap()));
}

fn criterion_reduce(c: &mut Criterion) {
    let scheme = Gf2Scheme::generate(Parameters::new(256, 32, 1, 32).unwrap()).unwrap();
    let a = EncryptedBinaryNumber::encrypt(&scheme, &[3], 3).unwrap();
    let m = EncryptedBinaryNumber::encrypt(&scheme, &[2], 3).unwrap();
    let reducer = ModularReducer::new(IterationBound::exact(2));

    let mut r = None;
    c.bench_function("reduce gf2", |b| {
        b.iter(|| r = Some(reducer.run(a.clone(), &m).unwrap()))
    });
    let r = r.unwrap();

    // Decrypting after the reduction is much slower than before,
    // as every and gate multiplies the degree of the polynomials
    let mut d = Vec::new();
    c.bench_function("decrypt after reduce", |b| b.iter(|| d = r.decrypt(&scheme).unwrap()));

    assert_eq!(vec![1], d);
}

fn criterion_reduce_slots(c: &mut Criterion) {
    // All dividends below 256 modulo 15, one per slot
    let scheme = ClearScheme::new(256);
    let values: Vec<u64> = (0..256).collect();
    let a = EncryptedBinaryNumber::encrypt(&scheme, &values, 9).unwrap();
    let m = EncryptedBinaryNumber::encrypt(&scheme, &[15; 256], 9).unwrap();
    let reducer = ModularReducer::new(IterationBound::worst_case(8, 15).unwrap());

    c.bench_function("reduce clear slots", |b| {
        b.iter(|| reducer.run(a.clone(), &m).unwrap())
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().measurement_time(core::time::Duration::from_secs(10));
    targets = criterion_cipher, criterion_primitives, criterion_reduce, criterion_reduce_slots
);
criterion_main!(benches);
