//! Single-attempt draw throughput on the 2018/19 fixture.
//!
//! Run with: `cargo bench --bench draw`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use groupdraw::config::DrawConfig;
use groupdraw::data::{load_catalog, CandidateCatalog};
use groupdraw::draw::attempt_draw;

fn fixture() -> CandidateCatalog {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/ucl_2018_19.csv");
    load_catalog(path, 8).expect("fixture catalog should load")
}

fn bench_attempts(c: &mut Criterion) {
    let catalog = fixture();
    let default_layout = DrawConfig::default();
    let separated = DrawConfig {
        separate_paired: true,
        ..DrawConfig::default()
    };

    let mut group = c.benchmark_group("attempt_draw");
    group.throughput(Throughput::Elements(1));

    let mut seed = 0u64;
    group.bench_function("default", |b| {
        b.iter(|| {
            seed = seed.wrapping_add(1);
            black_box(attempt_draw(&catalog, &default_layout, seed).is_ok())
        });
    });

    let mut seed = 0u64;
    group.bench_function("separate_paired", |b| {
        b.iter(|| {
            seed = seed.wrapping_add(1);
            black_box(attempt_draw(&catalog, &separated, seed).is_ok())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_attempts);
criterion_main!(benches);
