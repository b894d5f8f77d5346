//! Benchmarks for the stacktag fit/predict pipeline.
//!
//! Run with: cargo bench -p stacktag-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stacktag_core::config::VectorizerConfig;
use stacktag_core::text::TextAnalyzer;
use stacktag_core::{LabelEncoder, ModelConfig, TagPipeline, TfidfVectorizer};

const TOPICS: &[(&str, &str)] = &[
    ("python", "python list comprehension dictionary pandas dataframe import module"),
    ("javascript", "javascript promise async await callback array map react node"),
    ("rust", "rust borrow checker lifetime trait generic cargo ownership"),
    ("sql", "sql join select query index postgres table foreign key"),
    ("css", "css flexbox grid layout selector margin padding responsive"),
];

/// Synthetic corpus of `n` posts cycling through a few topics.
fn corpus(n: usize) -> (Vec<String>, Vec<Vec<String>>) {
    (0..n)
        .map(|i| {
            let (tag, words) = TOPICS[i % TOPICS.len()];
            let doc = format!("<p>Question {i} about {words} and error {}</p>", i % 17);
            let mut tags = vec![tag.to_string()];
            if i % 7 == 0 {
                tags.push("performance".to_string());
            }
            (doc, tags)
        })
        .unzip()
}

fn benchmark_analyze(c: &mut Criterion) {
    let analyzer = TextAnalyzer::new(VectorizerConfig::default());
    let doc = "<p>How do I use C# generics with async/await &amp; LINQ in .NET 8?</p>";

    c.bench_function("analyze_document", |b| {
        b.iter(|| analyzer.analyze(black_box(doc)))
    });
}

fn benchmark_vectorize(c: &mut Criterion) {
    let (docs, _) = corpus(500);
    let vectorizer = match TfidfVectorizer::fit(&docs, VectorizerConfig::default()) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Skipping vectorize benchmark: {e}");
            return;
        }
    };

    c.bench_function("tfidf_fit_500", |b| {
        b.iter(|| TfidfVectorizer::fit(black_box(&docs), VectorizerConfig::default()))
    });
    c.bench_function("tfidf_transform_one", |b| {
        b.iter(|| vectorizer.transform_one(black_box(&docs[3])))
    });
}

fn benchmark_predict(c: &mut Criterion) {
    let (docs, tags) = corpus(500);
    let pipeline = LabelEncoder::fit(&tags).and_then(|encoder| {
        TagPipeline::fit(&docs, encoder.transform(&tags), &ModelConfig::default())
    });
    let pipeline = match pipeline {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Skipping predict benchmark: {e}");
            return;
        }
    };
    let query = "async await promise callback in node";

    c.bench_function("mlknn_predict_one_500", |b| {
        b.iter(|| pipeline.predict_one(black_box(query)))
    });
}

criterion_group!(
    benches,
    benchmark_analyze,
    benchmark_vectorize,
    benchmark_predict,
);

criterion_main!(benches);
