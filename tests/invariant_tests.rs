//! Properties that must hold for any corpus and memory budget

use std::collections::BTreeSet;
use std::io::Write;

use tempfile::TempDir;

use burrow::config::TokenizerConfig;
use burrow::segment::{IndexStore, MemoryIndex, Posting, TermDictionary};
use burrow::{build_index, Corpus, FullScan, Pipeline, QueryEngine, ScoredDocument, ScoringMode};

const VOCABULARY: &[&str] = &[
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliet",
    "kilo", "lima",
];

/// Deterministic pseudo-random corpus
fn generate_corpus(dir: &std::path::Path, documents: usize) -> Corpus {
    let path = dir.join("corpus.jsonl");
    let mut file = std::fs::File::create(&path).unwrap();
    let mut state = 0x2545_f491u32;
    for i in 0..documents {
        let mut words = Vec::new();
        let len = 3 + (i % 9);
        for _ in 0..len {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            words.push(VOCABULARY[state as usize % VOCABULARY.len()]);
        }
        let line = serde_json::json!({ "title": format!("doc {}", i), "text": words.join(" ") });
        writeln!(file, "{}", line).unwrap();
    }
    Corpus::open(&path).unwrap()
}

fn plain() -> Pipeline {
    Pipeline::from_config(&TokenizerConfig::plain()).unwrap()
}

fn scan_all(store: &IndexStore) -> Vec<(String, Vec<Posting>)> {
    store
        .scan()
        .unwrap()
        .map(|record| {
            let record = record.unwrap();
            let postings = record.postings.map(|p| p.unwrap()).collect();
            (record.token, postings)
        })
        .collect()
}

fn hit_set(result: &ScoredDocument) -> BTreeSet<(String, u16)> {
    result
        .hits
        .iter()
        .map(|h| (h.term.clone(), h.position))
        .collect()
}

#[test]
fn sortedness_holds_after_many_merges() {
    let tmp = TempDir::new().unwrap();
    let corpus = generate_corpus(tmp.path(), 200);
    let (store, stats) = build_index(&corpus, &plain(), tmp.path().join("index.bin"), 256).unwrap();
    assert!(stats.merges > 10);

    let records = scan_all(&store);
    for pair in records.windows(2) {
        assert!(pair[0].0 < pair[1].0, "{} !< {}", pair[0].0, pair[1].0);
    }
    for (token, postings) in &records {
        for pair in postings.windows(2) {
            assert!(pair[0] < pair[1], "{}: {} !< {}", token, pair[0], pair[1]);
        }
    }
}

#[test]
fn memory_limit_does_not_change_index_contents() {
    let tmp = TempDir::new().unwrap();
    let corpus = generate_corpus(tmp.path(), 120);

    let (small, _) = build_index(&corpus, &plain(), tmp.path().join("small.bin"), 200).unwrap();
    let (large, large_stats) =
        build_index(&corpus, &plain(), tmp.path().join("large.bin"), usize::MAX).unwrap();
    assert_eq!(large_stats.merges, 1);

    assert_eq!(scan_all(&small), scan_all(&large));
    assert_eq!(
        std::fs::read(tmp.path().join("small.bin")).unwrap(),
        std::fs::read(tmp.path().join("large.bin")).unwrap()
    );
}

#[test]
fn merging_empty_memory_index_is_noop() {
    let tmp = TempDir::new().unwrap();
    let corpus = generate_corpus(tmp.path(), 40);
    let (mut store, _) = build_index(&corpus, &plain(), tmp.path().join("index.bin"), 512).unwrap();
    let before = scan_all(&store);

    store.merge(&MemoryIndex::new(1024)).unwrap();
    assert_eq!(scan_all(&store), before);
}

#[test]
fn capacity_exceeded_exactly_when_limit_first_passed() {
    let mut memory = MemoryIndex::new(200);
    let mut signalled = 0;
    for i in 0..100u32 {
        let token = VOCABULARY[i as usize % VOCABULARY.len()];
        let before = memory.size_bytes();
        match memory.add(token, Posting::new(i, 0)) {
            Ok(()) => assert!(memory.size_bytes() <= 200),
            Err(e) => {
                assert!(e.is_recoverable());
                assert!(before <= 200);
                assert!(memory.size_bytes() > 200);
                signalled += 1;
                memory.clear();
            }
        }
    }
    assert!(signalled > 0);
}

#[test]
fn merge_tie_break_puts_stored_posting_first() {
    let tmp = TempDir::new().unwrap();
    let mut store = IndexStore::open_for_build(tmp.path().join("index.bin")).unwrap();

    let mut memory = MemoryIndex::new(usize::MAX);
    memory.add("echo", Posting::new(10, 2)).unwrap();
    store.merge(&memory).unwrap();

    memory.clear();
    memory.add("echo", Posting::new(10, 5)).unwrap();
    memory.add("echo", Posting::new(11, 0)).unwrap();
    store.merge(&memory).unwrap();

    assert_eq!(
        scan_all(&store),
        vec![(
            "echo".to_string(),
            vec![Posting::new(10, 2), Posting::new(10, 5), Posting::new(11, 0)]
        )]
    );
}

#[test]
fn interleaved_cursors_match_isolated_reads() {
    let tmp = TempDir::new().unwrap();
    let corpus = generate_corpus(tmp.path(), 300);
    let (store, _) = build_index(&corpus, &plain(), tmp.path().join("index.bin"), 4096).unwrap();
    let lookup = TermDictionary::build(&store).unwrap();

    let a = lookup.get("alpha").unwrap();
    let b = lookup.get("lima").unwrap();
    let isolated_a: Vec<Posting> = store.read_pointer(a).map(|p| p.unwrap()).collect();
    let isolated_b: Vec<Posting> = store.read_pointer(b).map(|p| p.unwrap()).collect();

    let mut cursor_a = store.read_pointer(a);
    let mut cursor_b = store.read_pointer(b);
    let mut interleaved_a = Vec::new();
    let mut interleaved_b = Vec::new();
    loop {
        let next_a = cursor_a.next();
        let next_b = cursor_b.next();
        if next_a.is_none() && next_b.is_none() {
            break;
        }
        interleaved_a.extend(next_a.map(|p| p.unwrap()));
        interleaved_b.extend(next_b.map(|p| p.unwrap()));
    }

    assert_eq!(interleaved_a, isolated_a);
    assert_eq!(interleaved_b, isolated_b);
}

#[test]
fn index_matches_full_scan() {
    let tmp = TempDir::new().unwrap();
    let corpus = generate_corpus(tmp.path(), 250);
    let pipeline = plain();
    let (store, _) = build_index(&corpus, &pipeline, tmp.path().join("index.bin"), 1024).unwrap();
    let engine = QueryEngine::open(store, plain(), ScoringMode::Boolean).unwrap();
    let scan = FullScan::new(&corpus, &pipeline);

    for query in ["alpha", "alpha bravo", "charlie delta echo", "kilo lima alpha", "golf golf", "zulu"] {
        let indexed: Vec<ScoredDocument> = engine.query(query).unwrap().map(|r| r.unwrap()).collect();
        let scanned: Vec<ScoredDocument> = scan.query(query).unwrap().map(|r| r.unwrap()).collect();

        let indexed_ids: Vec<u32> = indexed.iter().map(|r| r.document_id).collect();
        let scanned_ids: Vec<u32> = scanned.iter().map(|r| r.document_id).collect();
        assert_eq!(indexed_ids, scanned_ids, "query {:?}", query);

        for (i, s) in indexed.iter().zip(&scanned) {
            assert_eq!(hit_set(i), hit_set(s), "query {:?}", query);
        }
    }
}

#[test]
fn results_are_in_ascending_document_order() {
    let tmp = TempDir::new().unwrap();
    let corpus = generate_corpus(tmp.path(), 150);
    let (store, _) = build_index(&corpus, &plain(), tmp.path().join("index.bin"), 2048).unwrap();
    let engine = QueryEngine::open(store, plain(), ScoringMode::TfIdf).unwrap();

    let ids: Vec<u32> = engine
        .query("bravo hotel")
        .unwrap()
        .map(|r| r.unwrap().document_id)
        .collect();
    assert!(!ids.is_empty());
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}
