pub mod enrich;
pub mod keyvalue;
pub mod patterns;

use chrono::Local;
use tracing::warn;

use crate::error::IntakeError;
use crate::record::ExtractedRecord;
use crate::schema::SchemaRegistry;
use enrich::EntityEnricher;

pub const CAPTURED_AT_FIELD: &str = "Captured At";
pub const NOTES_FIELD: &str = "Notes";
const CAPTURED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Merge field candidates into one record under fixed precedence:
/// key:value lines first (explicit author intent), then pattern matches,
/// then entity candidates. Later stages only fill gaps.
///
/// After the merge, `Notes` is always the full trimmed input and
/// `Captured At` is always stamped from the invocation clock, never a
/// value parsed from the text.
pub fn resolve_fields(
    text: &str,
    enrichment: Option<Vec<(String, String)>>,
) -> Result<ExtractedRecord, IntakeError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(IntakeError::EmptyInput);
    }

    let mut record = ExtractedRecord::new();
    for (field, value) in keyvalue::parse(text) {
        record.set_if_absent(field, value);
    }
    for (field, value) in patterns::candidates(text) {
        record.set_if_absent(field, value);
    }
    if let Some(extra) = enrichment {
        for (field, value) in extra {
            record.set_if_absent(field, value);
        }
    }

    record.set(NOTES_FIELD, trimmed);
    record.set(
        CAPTURED_AT_FIELD,
        Local::now().format(CAPTURED_AT_FORMAT).to_string(),
    );
    Ok(record)
}

/// Full pipeline: optional enrichment, candidate merge, schema update.
/// Enrichment failure degrades to pattern + key:value results.
pub async fn extract<E: EntityEnricher + ?Sized>(
    text: &str,
    schema: &mut SchemaRegistry,
    enricher: Option<&E>,
) -> Result<ExtractedRecord, IntakeError> {
    // reject before spending a network call
    if text.trim().is_empty() {
        return Err(IntakeError::EmptyInput);
    }

    let enrichment = match enricher {
        Some(e) => match e.enrich(text).await {
            Ok(raw) => Some(enrich::remap_tags(raw)),
            Err(err) => {
                warn!("{} enricher skipped: {}", e.name(), err);
                None
            }
        },
        None => None,
    };

    let record = resolve_fields(text, enrichment)?;
    schema.absorb(&record);
    Ok(record)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use async_trait::async_trait;

    use super::*;

    struct StaticEnricher(BTreeMap<String, String>);

    #[async_trait]
    impl EntityEnricher for StaticEnricher {
        async fn enrich(&self, _text: &str) -> Result<BTreeMap<String, String>, IntakeError> {
            Ok(self.0.clone())
        }
        fn name(&self) -> &str {
            "static"
        }
    }

    struct FailingEnricher;

    #[async_trait]
    impl EntityEnricher for FailingEnricher {
        async fn enrich(&self, _text: &str) -> Result<BTreeMap<String, String>, IntakeError> {
            Err(IntakeError::EnrichmentUnavailable("offline".into()))
        }
        fn name(&self) -> &str {
            "failing"
        }
    }

    fn entities(pairs: &[(&str, &str)]) -> StaticEnricher {
        StaticEnricher(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn invoice_scenario() {
        let text = "Name: Ravi Kumar\nAge: 34\nEmail: ravi@x.com\nAmount: Rs 1,250.50";
        let r = resolve_fields(text, None).unwrap();
        assert_eq!(r.get("Name"), Some("Ravi Kumar"));
        assert_eq!(r.get("Age"), Some("34"));
        assert_eq!(r.get("Email"), Some("ravi@x.com"));
        assert_eq!(r.get("Amount"), Some("1250.50"));
    }

    #[test]
    fn empty_input_rejected() {
        assert!(matches!(resolve_fields("", None), Err(IntakeError::EmptyInput)));
        assert!(matches!(
            resolve_fields("  \n\t ", None),
            Err(IntakeError::EmptyInput)
        ));
    }

    #[test]
    fn notes_and_capture_stamp_always_set() {
        let r = resolve_fields("  just an unstructured sentence  ", None).unwrap();
        assert_eq!(r.get(NOTES_FIELD), Some("just an unstructured sentence"));
        let stamp = r.get(CAPTURED_AT_FIELD).unwrap();
        assert_eq!(stamp.len(), 19, "expected %Y-%m-%d %H:%M:%S, got {stamp}");
    }

    #[test]
    fn notes_overwrites_labeled_notes_line() {
        let text = "Name: Ravi\nNotes: short remark";
        let r = resolve_fields(text, None).unwrap();
        assert_eq!(r.get(NOTES_FIELD), Some(text));
    }

    #[test]
    fn keyvalue_beats_pattern() {
        // the bare 10-digit run would normally claim Phone; the explicit
        // label must win
        let text = "Phone: 12345\ncall me on 9876543210";
        let r = resolve_fields(text, None).unwrap();
        assert_eq!(r.get("Phone"), Some("12345"));
    }

    #[tokio::test]
    async fn keyvalue_beats_entity() {
        let mut schema = SchemaRegistry::with_core_fields();
        let e = entities(&[("PERSON", "Someone Else")]);
        let r = extract("Name: Ravi Kumar", &mut schema, Some(&e)).await.unwrap();
        assert_eq!(r.get("Name"), Some("Ravi Kumar"));
    }

    #[tokio::test]
    async fn pattern_beats_entity() {
        let mut schema = SchemaRegistry::with_core_fields();
        let e = entities(&[("Phone", "0000000000")]);
        let r = extract("reach me at 9876543210", &mut schema, Some(&e))
            .await
            .unwrap();
        assert_eq!(r.get("Phone"), Some("9876543210"));
    }

    #[tokio::test]
    async fn entity_fills_gaps() {
        let mut schema = SchemaRegistry::with_core_fields();
        let e = entities(&[("Product", "solar panel"), ("Warranty", "2 years")]);
        let r = extract("order from Ravi", &mut schema, Some(&e)).await.unwrap();
        assert_eq!(r.get("Product"), Some("solar panel"));
        assert_eq!(r.get("Warranty"), Some("2 years"));
        assert!(schema.contains("Warranty"));
    }

    #[tokio::test]
    async fn enricher_failure_is_soft() {
        let mut schema = SchemaRegistry::with_core_fields();
        let r = extract("Name: Ravi", &mut schema, Some(&FailingEnricher))
            .await
            .unwrap();
        assert_eq!(r.get("Name"), Some("Ravi"));
    }

    #[tokio::test]
    async fn schema_growth_is_idempotent() {
        let mut schema = SchemaRegistry::with_core_fields();
        let text = "gst no: 27AAEPM1234C1ZV\nName: Ravi";
        extract(text, &mut schema, None::<&StaticEnricher>).await.unwrap();
        let after_first = schema.len();
        extract(text, &mut schema, None::<&StaticEnricher>).await.unwrap();
        assert_eq!(schema.len(), after_first);
        assert!(schema.contains("Gst No"));
    }
}
