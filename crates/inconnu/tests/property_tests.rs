//! Property tests for resolution, redaction and restoration.

use inconnu::label::EntityLabel;
use inconnu::provider::KeywordProvider;
use inconnu::resolver::{ConflictResolver, is_non_overlapping};
use inconnu::span::{SpanCandidate, validate_spans};
use inconnu::{Inconnu, Restorer};
use proptest::prelude::*;

const LABELS: [EntityLabel; 6] = [
    EntityLabel::Person,
    EntityLabel::Org,
    EntityLabel::Gpe,
    EntityLabel::Date,
    EntityLabel::Ssn,
    EntityLabel::Misc,
];

fn candidate(len: usize) -> impl Strategy<Value = SpanCandidate> {
    let len = len as i64;
    (-2..=len + 2, 0..=len + 2, 0..LABELS.len(), prop::option::of(-5..20i32)).prop_map(
        |(start, width, label, priority)| {
            let span = SpanCandidate::new(LABELS[label].clone(), start, start + width);
            match priority {
                Some(p) => span.with_priority(p),
                None => span,
            }
        },
    )
}

fn document_and_candidates() -> impl Strategy<Value = (String, Vec<SpanCandidate>)> {
    "[a-zA-Z ]{1,60}".prop_flat_map(|doc| {
        let spans = prop::collection::vec(candidate(doc.len()), 0..20);
        (Just(doc), spans)
    })
}

fn engine() -> Inconnu {
    Inconnu::builder()
        .provider(
            KeywordProvider::new()
                .with_terms(&EntityLabel::Person, ["Ana", "Ben", "Cleo"])
                .with_terms(&EntityLabel::Gpe, ["Rome", "Lima"]),
        )
        .build()
        .unwrap()
}

fn sentence() -> impl Strategy<Value = String> {
    let word = prop_oneof![
        Just("Ana"),
        Just("Ben"),
        Just("Cleo"),
        Just("Rome"),
        Just("Lima"),
        Just("met"),
        Just("in"),
        Just("and"),
        Just("\n"),
        Just("today"),
    ];
    prop::collection::vec(word, 0..25).prop_map(|words| words.join(" "))
}

proptest! {
    #[test]
    fn resolved_spans_never_overlap((doc, candidates) in document_and_candidates()) {
        let valid = validate_spans(candidates, &doc).valid;
        let resolved = ConflictResolver::new().resolve(valid);
        prop_assert!(is_non_overlapping(&resolved));
        prop_assert!(resolved.windows(2).all(|w| w[0].start() <= w[1].start()));
    }

    #[test]
    fn resolution_ignores_input_order((doc, candidates) in document_and_candidates()) {
        let forward = ConflictResolver::new().resolve(validate_spans(candidates.clone(), &doc).valid);
        let mut reversed = candidates;
        reversed.reverse();
        let backward = ConflictResolver::new().resolve(validate_spans(reversed, &doc).valid);
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn validated_spans_are_in_bounds((doc, candidates) in document_and_candidates()) {
        let checked = validate_spans(candidates.clone(), &doc);
        prop_assert_eq!(checked.valid.len() + checked.errors.len(), candidates.len());
        for span in &checked.valid {
            prop_assert!(span.start() < span.end() && span.end() <= doc.len());
        }
    }

    #[test]
    fn pseudonymize_round_trips(text in sentence()) {
        let engine = engine();
        let (redacted, map) = engine.pseudonymize(&text).unwrap();
        prop_assert_eq!(engine.restore(&redacted, &map), text.clone());

        let result = engine.process(&text, true).unwrap();
        prop_assert_eq!(engine.deanonymize(&result), text);
    }

    #[test]
    fn placeholders_are_unique_and_positions_exact(text in sentence()) {
        let result = engine().process(&text, true).unwrap();
        prop_assert_eq!(result.entity_map.len(), result.entity_count);
        for (token, range) in &result.position_map {
            prop_assert_eq!(&result.redacted_text[range.start..range.end], token.as_str());
        }
    }

    #[test]
    fn restore_without_placeholders_is_identity(text in "[a-z ,.\n]{0,80}") {
        let map = [("[PERSON_0]".to_string(), "Ana".to_string())].into();
        prop_assert_eq!(Restorer::new().restore(&text, &map), text);
    }

    #[test]
    fn line_count_is_preserved(text in sentence()) {
        let redacted = engine().redact(&text).unwrap();
        prop_assert_eq!(redacted.lines().count(), text.lines().count());
    }
}
