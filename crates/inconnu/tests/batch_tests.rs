//! Integration tests for streaming and batch entry points.

use inconnu::label::EntityLabel;
use inconnu::provider::{FnProvider, KeywordProvider};
use inconnu::span::SpanCandidate;
use inconnu::{Config, EntityMap, Inconnu};

fn engine(batch_size: usize) -> Inconnu {
    Inconnu::builder()
        .provider(
            KeywordProvider::new()
                .with_terms(&EntityLabel::Person, ["Alice", "Bob", "Carol"])
                .with_term(EntityLabel::Gpe, "Oslo"),
        )
        .config(Config::new().batch_size(batch_size))
        .build()
        .unwrap()
}

fn documents() -> Vec<String> {
    (0..23)
        .map(|i| match i % 3 {
            0 => format!("Doc {i}: Alice wrote to Bob."),
            1 => format!("Doc {i}: Carol lives in Oslo."),
            _ => format!("Doc {i}: nothing sensitive."),
        })
        .collect()
}

#[test]
fn batch_matches_single_calls_for_any_group_size() {
    let docs = documents();
    for batch_size in [1, 2, 5, 23, 100] {
        let engine = engine(batch_size);
        let batch = engine.redact_batch(&docs).unwrap();
        let single: Vec<String> = docs.iter().map(|d| engine.redact(d).unwrap()).collect();
        assert_eq!(batch, single, "batch_size {batch_size}");
    }
}

#[test]
fn pseudonymize_batch_keeps_maps_independent() {
    let engine = engine(4);
    let results = engine.pseudonymize_batch(&["Alice met Bob", "Bob met Carol"]).unwrap();
    assert_eq!(results[0].0, "[PERSON_1] met [PERSON_0]");
    assert_eq!(results[0].1["[PERSON_0]"], "Bob");
    assert_eq!(results[1].1["[PERSON_0]"], "Carol");

    let restored = engine.restore_batch(&results);
    assert_eq!(restored, ["Alice met Bob", "Bob met Carol"]);
}

#[test]
fn batch_failure_returns_no_partial_results() {
    let provider = FnProvider::new("picky", |text: &str| {
        if text.contains("poison") {
            Err("cannot parse document".into())
        } else {
            Ok(Vec::<SpanCandidate>::new())
        }
    });
    let engine = Inconnu::builder()
        .provider(provider)
        .config(Config::new().batch_size(2))
        .build()
        .unwrap();
    let err = engine.redact_batch(&["fine", "fine", "poison", "fine"]).unwrap_err();
    assert!(err.is_processing());
}

#[test]
fn oversized_document_fails_the_batch() {
    let engine = Inconnu::builder()
        .config(Config::new().max_text_length(10).chunk_size(5).chunk_overlap(1))
        .build()
        .unwrap();
    let err = engine.redact_batch(&["short", "far too long for the limit"]).unwrap_err();
    assert!(err.is_text_too_long());
}

#[test]
fn stream_redacts_across_windows() {
    let engine = engine(10);
    let text = "Alice and Bob went to Oslo. ".repeat(20);
    let streamed = engine.redact_stream_with(&text, 100, 20).unwrap();
    assert!(!streamed.contains("Alice"));
    assert!(!streamed.contains("Oslo"));
    assert!(streamed.starts_with("[PERSON] and [PERSON] went to [GPE]."));
}

#[test]
fn stream_bypasses_whole_document_limit() {
    let engine = Inconnu::builder()
        .provider(KeywordProvider::new().with_term(EntityLabel::Person, "Alice"))
        .config(Config::new().max_text_length(200).chunk_size(100).chunk_overlap(10))
        .build()
        .unwrap();
    let text = "Alice. ".repeat(60);
    assert!(engine.redact(&text).unwrap_err().is_text_too_long());
    assert!(!engine.redact_stream(&text).unwrap().contains("Alice"));
}

#[test]
fn stream_rejects_bad_window() {
    let err = engine(10).redact_stream_with("text", 10, 10).unwrap_err();
    assert!(err.is_config());
}

#[tokio::test]
async fn async_batch_preserves_order() {
    let docs = documents();
    let engine = engine(4);
    let expected = engine.redact_batch(&docs).unwrap();
    let actual = engine.redact_batch_async(docs).await.unwrap();
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn async_pseudonymize_and_restore() {
    let engine = engine(3);
    let docs = documents();
    let results = engine.pseudonymize_batch_async(docs.clone()).await.unwrap();
    let restored = engine.restore_batch_async(results).await.unwrap();
    assert_eq!(restored, docs);
}

#[tokio::test]
async fn async_batch_surfaces_failures() {
    let provider = FnProvider::new("picky", |text: &str| {
        if text == "poison" {
            Err("bad input".into())
        } else {
            Ok(Vec::<SpanCandidate>::new())
        }
    });
    let engine = Inconnu::builder()
        .provider(provider)
        .config(Config::new().batch_size(1))
        .build()
        .unwrap();
    let docs = vec!["ok".to_string(), "poison".to_string()];
    assert!(engine.redact_batch_async(docs).await.unwrap_err().is_processing());
}

#[tokio::test]
async fn async_empty_batch() {
    let engine = engine(5);
    assert!(engine.redact_batch_async(Vec::new()).await.unwrap().is_empty());
    let restored = engine
        .restore_batch_async(Vec::<(String, EntityMap)>::new())
        .await
        .unwrap();
    assert!(restored.is_empty());
}
