use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use micadb::ExecutionEngine;
use std::hint::black_box;

fn setup_populated_engine(n: usize) -> ExecutionEngine {
    let mut engine = ExecutionEngine::new();

    engine
        .execute("CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR(30), age INT, active BOOLEAN)")
        .unwrap();

    for i in 0..n {
        engine
            .execute(&format!(
                "INSERT INTO users (name, age, active) VALUES ('user{}', {}, {})",
                i,
                i % 100,
                if i % 2 == 0 { "TRUE" } else { "FALSE" }
            ))
            .unwrap();
    }
    engine
}

fn bench_insert_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_pipeline");
    group.bench_function("insert_single_row", |b| {
        let mut engine = ExecutionEngine::new();
        engine
            .execute("CREATE TABLE t (id INT PRIMARY KEY, v INT)")
            .unwrap();
        b.iter(|| {
            engine
                .execute(black_box("INSERT INTO t (v) VALUES (42)"))
                .unwrap();
        });
    });
    group.finish();
}

fn bench_select_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_where");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::new("full_scan", n), n, |b, &n| {
            let mut engine = setup_populated_engine(n);
            b.iter(|| {
                let res = engine
                    .execute(black_box("SELECT * FROM users WHERE age = 42"))
                    .unwrap();
                black_box(res);
            });
        });

        group.bench_with_input(BenchmarkId::new("indexed_point", n), n, |b, &n| {
            let mut engine = setup_populated_engine(n);
            let query = format!("SELECT * FROM users WHERE id = {}", n / 2);
            b.iter(|| {
                let res = engine.execute(black_box(&query)).unwrap();
                black_box(res);
            });
        });
    }
    group.finish();
}

fn bench_update_performance(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            b.iter_with_setup(
                || setup_populated_engine(n),
                |mut engine| {
                    engine
                        .execute("UPDATE users SET age = 99 WHERE active = TRUE")
                        .unwrap();
                    black_box(engine);
                },
            );
        });
    }
    group.finish();
}

fn bench_delete_performance(c: &mut Criterion) {
    let mut group = c.benchmark_group("delete");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            b.iter_with_setup(
                || setup_populated_engine(n),
                |mut engine| {
                    engine
                        .execute("DELETE FROM users WHERE age > 90")
                        .unwrap();
                    black_box(engine);
                },
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_insert_pipeline,
    bench_select_scaling,
    bench_update_performance,
    bench_delete_performance
);
criterion_main!(benches);
