//! Integration tests for placeholder restoration.

use std::sync::{Arc, Mutex};

use inconnu::label::EntityLabel;
use inconnu::provider::KeywordProvider;
use inconnu::{EntityMap, Inconnu, RestoreStrategy, Restorer};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Collects the fields of every WARN event.
#[derive(Clone, Default)]
struct WarnCollector {
    events: Arc<Mutex<Vec<String>>>,
}

struct FieldText<'a>(&'a mut String);

impl Visit for FieldText<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.push_str(&format!("{}={value:?} ", field.name()));
    }
}

impl<S: Subscriber> Layer<S> for WarnCollector {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            let mut text = String::new();
            event.record(&mut FieldText(&mut text));
            self.events.lock().unwrap().push(text);
        }
    }
}

fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
    let collector = WarnCollector::default();
    let subscriber = tracing_subscriber::registry().with(collector.clone());
    let out = tracing::subscriber::with_default(subscriber, f);
    let events = collector.events.lock().unwrap().clone();
    (out, events)
}

fn map(pairs: &[(&str, &str)]) -> EntityMap {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn engine() -> Inconnu {
    Inconnu::builder()
        .provider(
            KeywordProvider::new()
                .with_term(EntityLabel::Person, "John Doe")
                .with_term(EntityLabel::Person, "Jane Roe")
                .with_term(EntityLabel::Org, "Acme"),
        )
        .build()
        .unwrap()
}

#[test]
fn hallucinated_token_warns_once() {
    let entities = map(&[("[PERSON_0]", "John")]);
    let (text, warnings) = capture_warnings(|| {
        Restorer::new().restore("Hello [PERSON_0], friend [PERSON_99] called.", &entities)
    });

    assert_eq!(text, "Hello John, friend [PERSON_99] called.");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("[PERSON_99]"));
    assert!(!warnings[0].contains("[PERSON_0]"));
}

#[test]
fn repeated_hallucinations_still_warn_once() {
    let entities = map(&[("[PERSON_0]", "John")]);
    let (report, warnings) = capture_warnings(|| {
        Restorer::new().restore_with_report("[ORG_3] [PERSON_7] [ORG_3]", &entities, None)
    });
    assert_eq!(report.unmatched, ["[ORG_3]", "[PERSON_7]"]);
    assert_eq!(warnings.len(), 1);
}

#[test]
fn warning_can_be_disabled() {
    let entities = map(&[("[PERSON_0]", "John")]);
    let (_, warnings) = capture_warnings(|| {
        Restorer::new()
            .warn_on_unmatched(false)
            .restore("[PERSON_1]", &entities)
    });
    assert!(warnings.is_empty());
}

#[test]
fn clean_text_is_returned_unchanged() {
    let entities = map(&[("[PERSON_0]", "John")]);
    let (text, warnings) = capture_warnings(|| Restorer::new().restore("Nothing to see.", &entities));
    assert_eq!(text, "Nothing to see.");
    assert!(warnings.is_empty());
}

#[test]
fn lookalike_in_source_survives_round_trip() {
    let engine = engine();
    let original = "The code uses [PERSON_0] as a variable name. John Doe wrote it.";
    let result = engine.process(original, true).unwrap();

    assert_eq!(result.entity_map.len(), 1);
    assert_eq!(result.entity_map["[PERSON_0]"], "John Doe");
    assert_eq!(engine.deanonymize(&result), original);

    let report = engine.restore_with_report(
        &result.redacted_text,
        &result.entity_map,
        Some(&result.position_map),
    );
    assert_eq!(report.strategy, RestoreStrategy::Positions);
    assert!(report.unmatched.is_empty());
}

#[test]
fn rewritten_text_uses_scan() {
    let engine = engine();
    let result = engine
        .process("John Doe from Acme met Jane Roe.", true)
        .unwrap();
    assert_eq!(result.redacted_text, "[PERSON_1] from [ORG_0] met [PERSON_0].");

    // A downstream summary reorders the tokens.
    let summary = "Summary: [PERSON_0] and [PERSON_1] ([ORG_0]) met.";
    let report = engine.restore_with_report(summary, &result.entity_map, Some(&result.position_map));
    assert_eq!(report.strategy, RestoreStrategy::Scan);
    assert_eq!(report.text, "Summary: Jane Roe and John Doe (Acme) met.");
}

#[test]
fn deanonymize_after_edit_falls_back() {
    let engine = engine();
    let mut result = engine.process("Ask John Doe.", true).unwrap();
    result.redacted_text = format!("FW: {}", result.redacted_text);
    assert!(!result.is_unchanged());
    assert_eq!(engine.deanonymize(&result), "FW: Ask John Doe.");
}

#[test]
fn anonymized_text_is_not_restorable() {
    let engine = engine();
    let result = engine.process("John Doe", false).unwrap();
    assert!(!result.is_restorable());
    assert_eq!(engine.deanonymize(&result), "[PERSON]");
}

#[test]
fn empty_map_is_noop() {
    let (text, warnings) = capture_warnings(|| Restorer::new().restore("[PERSON_0]", &EntityMap::new()));
    assert_eq!(text, "[PERSON_0]");
    assert!(warnings.is_empty());
}
