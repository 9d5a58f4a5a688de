//! Request pipeline benchmarks
//!
//! Measures the CPU-bound steps between retrieval and generation:
//! - Score normalization
//! - Prompt assembly
//! - Evidence reconciliation against a long answer

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lexrag_core::prompt::{build_prompt, Persona};
use lexrag_core::{normalize_scores, reconcile, RetrievedDocument};

fn sample_documents(n: usize) -> Vec<RetrievedDocument> {
    (0..n)
        .map(|i| RetrievedDocument {
            text: format!(
                "Section {}. Whoever, with the intention of causing death, does any act by which death is caused, commits the offence defined in this section. {}",
                300 + i,
                "Explanation. ".repeat(20)
            ),
            filename: Some(format!("IPC-{}.txt", 300 + i)),
            score: 1.0 - i as f64 / n as f64,
        })
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_scores");
    for size in [3usize, 10, 100] {
        let distances: Vec<f64> = (0..size).map(|i| i as f64 * 0.37).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &distances, |b, d| {
            b.iter(|| normalize_scores(black_box(d)))
        });
    }
    group.finish();
}

fn bench_prompt(c: &mut Criterion) {
    let docs = sample_documents(3);
    let instructions = Persona::PenalCode.default_instructions();

    c.bench_function("build_prompt_top3", |b| {
        b.iter(|| {
            build_prompt(
                black_box(instructions),
                black_box(&docs),
                black_box("IPC for murder based on intention?"),
            )
        })
    });
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    for size in [3usize, 20] {
        let docs = sample_documents(size);
        let answer = format!(
            "{}\n\n{}",
            "The accused is liable under the following provisions. ".repeat(40),
            docs[0].text
        );
        group.bench_with_input(BenchmarkId::from_parameter(size), &docs, |b, docs| {
            b.iter(|| reconcile(black_box(&answer), black_box(docs)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_normalize, bench_prompt, bench_reconcile);
criterion_main!(benches);
