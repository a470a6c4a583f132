use criterion::{criterion_group, criterion_main, Criterion};
use std::fmt::Write;
use tenk_manifest::{compute_manifest_id, normalize_str, parse_puppetfile_str, ParseOptions};

fn synthetic_puppetfile(modules: usize) -> String {
    let mut out = String::from("forge.baseUrl 'https://forge.example.com'\nforge.cacheTtl 50m\n");
    for i in 0..modules {
        if i % 2 == 0 {
            let _ = writeln!(
                out,
                "mod 'gitmod{i}',:git => 'https://example.com/gitmod{i}.git',:branch => 'main',:fallback => 'dev|qa|live'"
            );
        } else {
            let _ = writeln!(out, "mod 'acme/forgemod{i}', '1.0.{i}'");
        }
    }
    out
}

fn bench_parse(c: &mut Criterion) {
    let options = ParseOptions::default();
    for size in [10usize, 100, 500] {
        let input = synthetic_puppetfile(size);
        c.bench_function(&format!("parse_puppetfile_{size}_modules"), |b| {
            b.iter(|| parse_puppetfile_str(&input, "Puppetfile", &options).unwrap());
        });
    }
}

fn bench_normalize_and_identity(c: &mut Criterion) {
    let input = synthetic_puppetfile(500);
    c.bench_function("normalize_500_modules", |b| {
        b.iter(|| normalize_str(&input));
    });
    let normalized = normalize_str(&input);
    c.bench_function("manifest_identity_500_modules", |b| {
        b.iter(|| compute_manifest_id(&normalized));
    });
}

criterion_group!(benches, bench_parse, bench_normalize_and_identity);
criterion_main!(benches);
