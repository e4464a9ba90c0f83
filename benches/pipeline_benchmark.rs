//! Benchmarks for sectionrank's per-document pipeline stages.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic spans, so no PDFs or model files are needed.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sectionrank::classify::{DecisionTree, ModelInput, SpanModel, TreeEnsemble};
use sectionrank::features;
use sectionrank::{OutlineBuilder, SpanLabel, TextSpan};

/// Creates spans for a document with a heading every ten lines.
fn create_spans(count: usize) -> Vec<TextSpan> {
    (0..count)
        .filter_map(|i| {
            let page = (i / 40) as u32 + 1;
            if i % 10 == 0 {
                TextSpan::from_raw(
                    format!("{}. Section heading", i / 10 + 1),
                    Some(16.0),
                    Some("Helvetica-Bold".into()),
                    page,
                )
            } else {
                TextSpan::from_raw(
                    format!("Body line {} of the benchmark document.", i),
                    Some(11.0),
                    Some("Helvetica".into()),
                    page,
                )
            }
        })
        .collect()
}

/// Creates a depth-3 tree splitting on size, bold and enumerator columns.
fn create_tree(n_classes: usize) -> DecisionTree {
    let leaf = |class: usize| {
        let mut value = vec![0.5; n_classes];
        value[class % n_classes] = 10.0;
        value
    };
    DecisionTree {
        children_left: vec![1, 2, -1, -1, 5, -1, -1],
        children_right: vec![4, 3, -1, -1, 6, -1, -1],
        feature: vec![0, 1, -2, -2, 4, -2, -2],
        threshold: vec![0.0, 0.5, -2.0, -2.0, 0.5, -2.0, -2.0],
        value: vec![
            vec![1.0; n_classes],
            vec![1.0; n_classes],
            leaf(3),
            leaf(1),
            vec![1.0; n_classes],
            leaf(0),
            leaf(2),
        ],
    }
}

/// Benchmark feature encoding at various document sizes.
fn bench_feature_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("feature_encoding");

    for span_count in [100, 1_000, 10_000].iter() {
        let spans = create_spans(*span_count);

        group.bench_function(format!("{}_spans", span_count), |b| {
            b.iter(|| features::encode(black_box(&spans)));
        });
    }

    group.finish();
}

/// Benchmark ensemble prediction.
fn bench_tree_predict(c: &mut Criterion) {
    let ensemble = TreeEnsemble::new(4, (0..50).map(|_| create_tree(4)).collect()).unwrap();
    let rows: Vec<ModelInput> = (0..1_000)
        .map(|i| {
            let x = i as f64;
            [x.sin(), (i % 2) as f64, 0.0, x.cos(), (i % 3 == 0) as u8 as f64, 1.0, 2.0, 0.0]
        })
        .collect();

    c.bench_function("tree_predict_1000_rows", |b| {
        b.iter(|| ensemble.predict(black_box(&rows)).unwrap());
    });
}

/// Benchmark outline construction from a labeled sequence.
fn bench_outline_builder(c: &mut Criterion) {
    let labels: Vec<(SpanLabel, String, u32)> = (0..5_000)
        .map(|i| {
            let label = match i % 12 {
                0 => SpanLabel::Heading(1),
                4 => SpanLabel::Heading(2),
                8 => SpanLabel::Heading(3),
                11 => SpanLabel::Other,
                _ => SpanLabel::Paragraph,
            };
            (label, format!("Line {}", i), (i / 50) as u32 + 1)
        })
        .collect();

    c.bench_function("outline_builder_5000_spans", |b| {
        b.iter(|| {
            let mut builder = OutlineBuilder::new();
            for (label, text, page) in &labels {
                builder.push(*label, text, *page);
            }
            black_box(builder.finish())
        });
    });
}

criterion_group!(
    benches,
    bench_feature_encoding,
    bench_tree_predict,
    bench_outline_builder,
);
criterion_main!(benches);
