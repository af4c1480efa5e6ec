use std::collections::BTreeMap;
use std::time::Instant;

use async_trait::async_trait;
use tracing::debug;

use crate::error::IntakeError;

/// Coarse categorical tags some extractors emit, translated to the
/// domain's canonical field names before merging. Unmapped tags are kept
/// verbatim as dynamic field names.
const TAG_MAP: &[(&str, &str)] = &[
    ("PERSON", "Name"),
    ("GPE", "City"),
    ("LOC", "City"),
    ("ORG", "Company"),
    ("DATE", "Date"),
    ("MONEY", "Amount"),
    ("QUANTITY", "Quantity"),
];

/// An injected entity-recognition capability. Strictly additive and
/// optional: the pipeline merges only fields it has not already
/// resolved, and an error here degrades extraction instead of failing it.
#[async_trait]
pub trait EntityEnricher: Send + Sync {
    async fn enrich(&self, text: &str) -> Result<BTreeMap<String, String>, IntakeError>;

    /// Identifier used in logs.
    fn name(&self) -> &str;
}

/// Translate coarse tags to canonical field names; drop empty values.
pub fn remap_tags(raw: BTreeMap<String, String>) -> Vec<(String, String)> {
    raw.into_iter()
        .filter(|(_, v)| !v.trim().is_empty())
        .map(|(tag, value)| {
            let field = TAG_MAP
                .iter()
                .find(|(t, _)| t.eq_ignore_ascii_case(&tag))
                .map(|(_, f)| f.to_string())
                .unwrap_or(tag);
            (field, value.trim().to_string())
        })
        .collect()
}

/// Hosted-model enricher speaking the OpenAI-compatible chat API.
/// Configured entirely from the environment; absence of the API key means
/// enrichment is simply unavailable, not an error.
pub struct RemoteEnricher {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

impl RemoteEnricher {
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("INTAKE_ENRICH_API_KEY").ok()?;
        let endpoint =
            std::env::var("INTAKE_ENRICH_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.into());
        let model = std::env::var("INTAKE_ENRICH_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        Some(Self {
            client: reqwest::Client::new(),
            endpoint,
            model,
            api_key,
        })
    }
}

#[async_trait]
impl EntityEnricher for RemoteEnricher {
    async fn enrich(&self, text: &str) -> Result<BTreeMap<String, String>, IntakeError> {
        let prompt = format!(
            "Extract structured fields from this input. Return a single flat JSON \
             object only, field name to string value. Use field names like Name, \
             Phone, Email, City, Product, Amount where they apply and invent a \
             short field name for anything else worth keeping.\n\nInput:\n{text}"
        );
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": 0,
        });

        let start = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| IntakeError::EnrichmentUnavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| IntakeError::EnrichmentUnavailable(e.to_string()))?;

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| IntakeError::EnrichmentUnavailable(e.to_string()))?;
        debug!(
            "enrichment call took {:.1}s",
            start.elapsed().as_secs_f64()
        );

        let content = parsed
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                IntakeError::EnrichmentUnavailable("no content in model response".into())
            })?;

        parse_field_object(content)
    }

    fn name(&self) -> &str {
        "remote"
    }
}

/// Parse the model's reply into a flat field map. Tolerates a ```json
/// fence around the object; anything that is not a flat object of
/// string/number values is rejected.
fn parse_field_object(content: &str) -> Result<BTreeMap<String, String>, IntakeError> {
    let trimmed = content.trim();
    let stripped = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    let value: serde_json::Value = serde_json::from_str(stripped)
        .map_err(|e| IntakeError::EnrichmentUnavailable(format!("bad model JSON: {e}")))?;
    let obj = value
        .as_object()
        .ok_or_else(|| IntakeError::EnrichmentUnavailable("model reply is not an object".into()))?;

    let mut fields = BTreeMap::new();
    for (k, v) in obj {
        let rendered = match v {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => continue,
        };
        if !rendered.trim().is_empty() {
            fields.insert(k.clone(), rendered);
        }
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remap_translates_coarse_tags() {
        let mut raw = BTreeMap::new();
        raw.insert("PERSON".to_string(), "Ravi Kumar".to_string());
        raw.insert("GPE".to_string(), "Pune".to_string());
        raw.insert("MONEY".to_string(), "1250".to_string());
        let mapped = remap_tags(raw);
        assert!(mapped.contains(&("Name".into(), "Ravi Kumar".into())));
        assert!(mapped.contains(&("City".into(), "Pune".into())));
        assert!(mapped.contains(&("Amount".into(), "1250".into())));
    }

    #[test]
    fn remap_keeps_unknown_tags_verbatim() {
        let mut raw = BTreeMap::new();
        raw.insert("Warranty".to_string(), "2 years".to_string());
        let mapped = remap_tags(raw);
        assert_eq!(mapped, vec![("Warranty".into(), "2 years".into())]);
    }

    #[test]
    fn remap_drops_empty_values() {
        let mut raw = BTreeMap::new();
        raw.insert("PERSON".to_string(), "  ".to_string());
        assert!(remap_tags(raw).is_empty());
    }

    #[test]
    fn parse_plain_object() {
        let f = parse_field_object(r#"{"Name": "Ravi", "Amount": 1250.5}"#).unwrap();
        assert_eq!(f.get("Name").map(String::as_str), Some("Ravi"));
        assert_eq!(f.get("Amount").map(String::as_str), Some("1250.5"));
    }

    #[test]
    fn parse_fenced_object() {
        let f = parse_field_object("```json\n{\"City\": \"Pune\"}\n```").unwrap();
        assert_eq!(f.get("City").map(String::as_str), Some("Pune"));
    }

    #[test]
    fn parse_rejects_non_object() {
        assert!(parse_field_object("[1, 2]").is_err());
        assert!(parse_field_object("not json at all").is_err());
    }

    #[test]
    fn parse_skips_nested_values() {
        let f = parse_field_object(r#"{"Name": "Ravi", "Extra": {"a": 1}}"#).unwrap();
        assert_eq!(f.len(), 1);
    }
}
