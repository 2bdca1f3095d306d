use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use dense_linalg::Matrix;
use dense_linalg::matrix::mul::{multiply, strassen};

fn bench_multiply(c: &mut Criterion) {
    // Powers of two plus sizes that force Strassen to pad.
    let sizes: [usize; 5] = [64, 100, 128, 200, 256];
    let leaf_size = 64;

    let mut group = c.benchmark_group("Matrix multiply");
    group.sample_size(20);

    for n in sizes {
        let a: Matrix = Matrix::random(n, n, 11);
        let b: Matrix = Matrix::random(n, n, 12);

        group.bench_with_input(BenchmarkId::new("standard", n), &(&a, &b), |bench, (a, b)| {
            bench.iter(|| multiply(black_box(a), black_box(b)).expect("multiply"));
        });

        group.bench_with_input(BenchmarkId::new("strassen", n), &(&a, &b), |bench, (a, b)| {
            bench.iter(|| strassen(black_box(a), black_box(b), leaf_size).expect("strassen"));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_multiply);
criterion_main!(benches);
