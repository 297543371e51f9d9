//! Merge performance benchmarks.
//!
//! Every page response is merged into the whole collection, so a deep scroll session
//! pays for the collection size on each page. These benchmarks cover a fresh page
//! appended to a long list and a fully duplicated page (a retried request).
//!
//! Run with: cargo bench

#![allow(missing_docs)] // criterion macros generate undocumented items

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use feedstate::merge::merge_unique_by_key;
use feedstate::model::Item;
use serde_json::json;

const PAGE_SIZE: u64 = 12;

fn items(range: std::ops::Range<u64>) -> Vec<Item> {
    range
        .map(|n| Item::new(json!({ "id": n, "title": format!("Post {n}") })))
        .collect()
}

fn bench_append_page(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_append_page");
    for pages in [1u64, 10, 100, 1000] {
        let existing = items(0..pages * PAGE_SIZE);
        let incoming = items(pages * PAGE_SIZE..(pages + 1) * PAGE_SIZE);
        group.bench_with_input(BenchmarkId::from_parameter(pages), &pages, |b, _| {
            b.iter(|| {
                merge_unique_by_key(
                    black_box(existing.clone()),
                    black_box(incoming.clone()),
                    Item::id,
                )
            })
        });
    }
    group.finish();
}

fn bench_duplicate_page(c: &mut Criterion) {
    let existing = items(0..1000 * PAGE_SIZE);
    let incoming = items(500 * PAGE_SIZE..501 * PAGE_SIZE);

    c.bench_function("merge_duplicate_page", |b| {
        b.iter(|| {
            let merged = merge_unique_by_key(
                black_box(existing.clone()),
                black_box(incoming.clone()),
                Item::id,
            );
            assert_eq!(merged.len(), existing.len());
            merged
        })
    });
}

criterion_group!(benches, bench_append_page, bench_duplicate_page);
criterion_main!(benches);
