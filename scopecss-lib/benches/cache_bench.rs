extern crate criterion;

use criterion::{criterion_group, criterion_main, Criterion};

use scopecss_lib::{ScopeConfig, ScopeResolver, StyleEngine};

fn bench_cache_hit(c: &mut Criterion) {
    let mut engine = StyleEngine::new();
    let fragments = ["color: ", "; padding: ", ";"];

    c.bench_function("cache_hit", |b| {
        b.iter(|| {
            engine
                .css(&fragments, vec!["red".into(), 4_i32.into()])
                .unwrap()
        })
    });
}

fn bench_cache_miss(c: &mut Criterion) {
    let mut engine = StyleEngine::new();
    let mut counter = 0_u64;

    c.bench_function("cache_miss", |b| {
        b.iter(|| {
            counter += 1;
            let source = format!(".item-{counter} {{ color: red }}");
            engine.css(&[source.as_str()], Vec::new()).unwrap()
        })
    });
}

fn bench_resolver(c: &mut Criterion) {
    let mut rules = Vec::with_capacity(1_000);
    for i in 0..1_000 {
        rules.push(format!(
            "s|tab[s|active=true] > label[for=\"field-{i}\"]:hover, :global(.link-{i}) span"
        ));
    }

    c.bench_function("resolve_rules", |b| {
        b.iter(|| {
            let mut resolver = ScopeResolver::new(ScopeConfig::local("s"));
            for rule in &rules {
                resolver.run(rule).unwrap();
            }
            resolver.elements().len()
        })
    });
}

criterion_group!(benches, bench_cache_hit, bench_cache_miss, bench_resolver);
criterion_main!(benches);
