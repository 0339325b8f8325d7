//! FILENAME: core/resultset-pivot/benches/pivot_calculations.rs
//! Pivot throughput over synthetic order rows in each axis layout.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use resultset_pivot::{calculate_pivot, Annotation, PivotConfig, QueryShape, RawRow};

const REGIONS: usize = 12;
const CATEGORIES: usize = 25;
const YEARS: usize = 6;

fn shape() -> QueryShape {
    QueryShape::new(
        ["Orders.count", "Orders.amount"],
        ["Orders.region", "Orders.category", "Orders.year"],
    )
}

fn build_rows(count: usize) -> Vec<RawRow> {
    (0..count)
        .map(|i| {
            RawRow::new()
                .with("Orders.region", format!("Region_{:02}", i % REGIONS))
                .with("Orders.category", format!("Category_{:02}", (i / REGIONS) % CATEGORIES))
                .with("Orders.year", (2000 + (i / (REGIONS * CATEGORIES)) % YEARS) as f64)
                .with("Orders.count", (i % 97) as f64)
                .with("Orders.amount", (i % 1013) as f64 * 1.5)
        })
        .collect()
}

fn layouts() -> Vec<(&'static str, PivotConfig)> {
    vec![
        ("flat_rows", PivotConfig::default()),
        (
            "nested_y",
            PivotConfig::new(["Orders.region"], ["Orders.year", "Orders.category", "measures"]),
        ),
        (
            "measures_first",
            PivotConfig::new(["Orders.region", "Orders.year"], ["measures", "Orders.category"]),
        ),
        (
            "measures_on_x",
            PivotConfig::new(["Orders.region", "measures"], ["Orders.category", "Orders.year"]),
        ),
    ]
}

fn bench_layouts(c: &mut Criterion) {
    let shape = shape();
    let annotation = Annotation::default();
    let mut group = c.benchmark_group("calculate_pivot");

    for count in [1_000usize, 10_000, 50_000] {
        let rows = build_rows(count);
        for (name, config) in layouts() {
            group.bench_with_input(BenchmarkId::new(name, count), &rows, |b, rows| {
                b.iter(|| calculate_pivot(black_box(&shape), &annotation, black_box(rows), &config))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_layouts);
criterion_main!(benches);
