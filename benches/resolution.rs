//! Benchmarks for span resolution and corpus evaluation.
//!
//! Uses only the built-in providers, so no model loading is involved.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use spanguard::eval::{evaluate_corpus, Corpus, CorpusRow, EvalOptions};
use spanguard::{Document, SpanResolver};

const PARAGRAPH: &str = "Dr. Ada Byrne of Byrne Holdings Inc. can be reached at ada.byrne@example.com \
or 555-123-4567. Her office is at 500 Oak Avenue Suite 12, Springfield, IL 62704, \
and her appointment is on March 3, 2024. See https://example.com/staff for more.";

fn create_document(paragraphs: usize) -> String {
    vec![PARAGRAPH; paragraphs].join("\n\n")
}

fn create_corpus(rows: usize) -> Corpus {
    let tokens: Vec<String> = PARAGRAPH.split_whitespace().map(String::from).collect();
    let tags = vec!["O".to_string(); tokens.len()];
    let ws = vec![true; tokens.len()];
    Corpus::from_rows((0..rows).map(|i| CorpusRow {
        document: i.to_string(),
        tokens: tokens.clone(),
        tags: tags.clone(),
        trailing_whitespace: ws.clone(),
        text: PARAGRAPH.to_string(),
    }))
}

fn bench_detect_document(c: &mut Criterion) {
    let resolver = SpanResolver::default();
    let mut group = c.benchmark_group("detect_document");

    for &paragraphs in &[1, 10, 100] {
        let text = create_document(paragraphs);
        group.bench_with_input(BenchmarkId::from_parameter(paragraphs), &text, |b, text| {
            b.iter(|| {
                let mut doc = Document::from_text("bench", black_box(text));
                resolver.detect_document(&mut doc).unwrap()
            })
        });
    }
    group.finish();
}

fn bench_evaluate_corpus(c: &mut Criterion) {
    let resolver = SpanResolver::default();
    let options = EvalOptions::default();
    let mut group = c.benchmark_group("evaluate_corpus");
    group.sample_size(20);

    for &rows in &[10, 100] {
        let corpus = create_corpus(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &corpus, |b, corpus| {
            b.iter(|| evaluate_corpus(&resolver, black_box(corpus), &options).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_detect_document, bench_evaluate_corpus);
criterion_main!(benches);
