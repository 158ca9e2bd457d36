use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

use burrow::config::TokenizerConfig;
use burrow::{build_index, Corpus, Pipeline, QueryEngine, ScoringMode};

const WORDS: &[&str] = &[
    "river", "mountain", "forest", "desert", "harbor", "valley", "island", "meadow", "canyon",
    "glacier", "prairie", "lagoon", "summit", "orchard", "marsh", "delta",
];

struct BenchEnv {
    _tmp: TempDir,
    corpus_path: PathBuf,
    index_path: PathBuf,
}

fn write_corpus(doc_count: usize) -> BenchEnv {
    let tmp = TempDir::new().unwrap();
    let corpus_path = tmp.path().join("corpus.jsonl");
    let index_path = tmp.path().join("index.bin");

    let mut file = std::fs::File::create(&corpus_path).unwrap();
    for i in 0..doc_count {
        let text: Vec<&str> = (0..24).map(|j| WORDS[(i * 7 + j * 3) % WORDS.len()]).collect();
        let line = serde_json::json!({ "title": format!("doc {}", i), "text": text.join(" ") });
        writeln!(file, "{}", line).unwrap();
    }

    BenchEnv {
        _tmp: tmp,
        corpus_path,
        index_path,
    }
}

fn pipeline() -> Pipeline {
    Pipeline::from_config(&TokenizerConfig::plain()).unwrap()
}

fn bench_build(c: &mut Criterion) {
    let env = write_corpus(2_000);
    let corpus = Corpus::open(&env.corpus_path).unwrap();
    let pipeline = pipeline();

    let mut group = c.benchmark_group("build_index");
    group.sample_size(10);
    for &limit in &[16 * 1024usize, 100 * 1024, 1024 * 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(limit), &limit, |b, &limit| {
            b.iter(|| {
                black_box(build_index(&corpus, &pipeline, &env.index_path, limit).unwrap());
            });
        });
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let env = write_corpus(5_000);
    let corpus = Corpus::open(&env.corpus_path).unwrap();
    let (store, _) = build_index(&corpus, &pipeline(), &env.index_path, 100 * 1024).unwrap();
    drop(store);

    let mut group = c.benchmark_group("query");
    for mode in [ScoringMode::Boolean, ScoringMode::TermFrequency, ScoringMode::TfIdf] {
        let engine = QueryEngine::open(
            burrow::IndexStore::open(&env.index_path).unwrap(),
            pipeline(),
            mode,
        )
        .unwrap();
        group.bench_with_input(BenchmarkId::new("conjunctive", mode), &engine, |b, engine| {
            b.iter(|| {
                let count = engine.query("river forest summit").unwrap().count();
                black_box(count);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_query);
criterion_main!(benches);
