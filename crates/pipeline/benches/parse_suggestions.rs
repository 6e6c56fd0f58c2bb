//! Benchmarks for suggestion parsing and filtering
//!
//! Run with: cargo bench --package pipeline

use catalog::{parse_suggestions, SeenTitlesRegistry};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pipeline::FilterPipeline;

fn sample_response(lines: usize) -> String {
    let mut text = String::from("Sure! Here are some movies you might enjoy:\n");
    for i in 0..lines {
        if i % 4 == 3 {
            text.push_str("I hope these help brighten your day.\n");
        } else {
            text.push_str(&format!(
                "{}. Movie Number {} ({}) - Drama - A story about day {}.\n",
                i + 1,
                i,
                1950 + (i % 70),
                i
            ));
        }
    }
    text
}

fn bench_parse_typical_response(c: &mut Criterion) {
    let response = sample_response(6);

    c.bench_function("parse_typical_response", |b| {
        b.iter(|| black_box(parse_suggestions(black_box(&response))))
    });
}

fn bench_parse_long_response(c: &mut Criterion) {
    let response = sample_response(200);

    c.bench_function("parse_long_response", |b| {
        b.iter(|| black_box(parse_suggestions(black_box(&response))))
    });
}

fn bench_filter_pipeline(c: &mut Criterion) {
    let response = sample_response(200);
    let pipeline = FilterPipeline::standard();
    let mut registry = SeenTitlesRegistry::new();
    for i in (0..200).step_by(2) {
        registry.insert(&format!("Movie Number {}", i));
    }

    c.bench_function("filter_pipeline_standard", |b| {
        b.iter(|| {
            let parsed = parse_suggestions(&response);
            black_box(pipeline.apply(parsed, black_box(&registry)))
        })
    });
}

criterion_group!(
    benches,
    bench_parse_typical_response,
    bench_parse_long_response,
    bench_filter_pipeline
);
criterion_main!(benches);
