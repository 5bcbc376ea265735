use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferrous_scope::*;
use std::sync::Arc;

// ===== Fixtures =====

trait Repository: Send + Sync {
    fn name(&self) -> &'static str;
}

struct SqlRepository {
    _config: Arc<Config>,
}

impl Repository for SqlRepository {
    fn name(&self) -> &'static str {
        "sql"
    }
}

impl Injectable for SqlRepository {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|config: Arc<Config>| SqlRepository { _config: config })]
    }
}

struct Config {
    _url: String,
}

struct Handler {
    repo: Arc<dyn Repository>,
    _config: Arc<Config>,
}

impl Injectable for Handler {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|repo: Arc<dyn Repository>, config: Arc<Config>| Handler {
            repo,
            _config: config,
        })]
    }
}

fn provider(options: ContainerOptions) -> ServiceProvider {
    let mut sc = ServiceCollection::new();
    sc.add_singleton(Config { _url: "postgres://localhost".to_string() });
    sc.add_scoped_as::<dyn Repository, SqlRepository, _>(|s| s);
    sc.add_transient_type::<Handler>();
    sc.build_with(options).unwrap()
}

fn strategies() -> [(&'static str, ContainerOptions); 2] {
    [
        ("compiled", ContainerOptions::default().compiled()),
        ("reflective", ContainerOptions::default().reflective()),
    ]
}

// ===== Micro Benchmarks =====

fn bench_singleton_hit(c: &mut Criterion) {
    let mut sc = ServiceCollection::new();
    sc.add_singleton(42u64);
    let sp = sc.build().unwrap();

    // Prime the singleton
    let _ = sp.get::<u64>().unwrap();

    c.bench_function("singleton_hit_u64", |b| {
        b.iter(|| {
            let v = sp.get::<u64>().unwrap();
            black_box(v);
        })
    });
}

fn bench_scoped_vs_transient(c: &mut Criterion) {
    struct Service {
        data: [u8; 64],
    }

    let mut group = c.benchmark_group("scoped_vs_transient");

    let mut sc_scoped = ServiceCollection::new();
    sc_scoped.add_scoped_factory::<Service, _>(|_| Ok(Service { data: [0; 64] }));
    let sp_scoped = sc_scoped.build().unwrap();
    let scope = sp_scoped.create_scope();
    let _ = scope.get::<Service>().unwrap();

    group.bench_function("scoped_hit", |b| {
        b.iter(|| black_box(scope.get::<Service>().unwrap().data[0]))
    });

    let mut sc_transient = ServiceCollection::new();
    sc_transient.add_transient_factory::<Service, _>(|_| Ok(Service { data: [0; 64] }));
    let sp_transient = sc_transient.build().unwrap();
    let scope = sp_transient.create_scope();

    group.bench_function("transient_build", |b| {
        b.iter(|| black_box(scope.get::<Service>().unwrap().data[0]))
    });

    group.finish();
}

// ===== Strategy Comparison =====

fn bench_constructor_injection(c: &mut Criterion) {
    let mut group = c.benchmark_group("constructor_injection");

    for (name, options) in strategies() {
        let sp = provider(options);
        let scope = sp.create_scope();
        let _ = scope.get::<Handler>().unwrap();

        group.bench_with_input(BenchmarkId::new("transient_handler", name), &scope, |b, scope| {
            b.iter(|| black_box(scope.get::<Handler>().unwrap().repo.name()))
        });
    }

    group.finish();
}

fn bench_fresh_scope(c: &mut Criterion) {
    let mut group = c.benchmark_group("fresh_scope");

    for (name, options) in strategies() {
        let sp = provider(options);
        let _ = sp.get::<Config>().unwrap();

        group.bench_with_input(BenchmarkId::new("create_resolve_dispose", name), &sp, |b, sp| {
            b.iter(|| {
                let scope = sp.create_scope();
                let handler = scope.get::<Handler>().unwrap();
                scope.dispose().unwrap();
                black_box(handler)
            })
        });
    }

    group.finish();
}

fn bench_cold_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("cold_compile");

    for (name, options) in strategies() {
        group.bench_function(name, |b| {
            b.iter_batched(
                || provider(options.clone()),
                |sp| black_box(sp.get::<Handler>().unwrap()),
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_singleton_hit,
    bench_scoped_vs_transient,
    bench_constructor_injection,
    bench_fresh_scope,
    bench_cold_compile
);
criterion_main!(benches);
