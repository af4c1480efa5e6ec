use crate::extract::patterns;
use crate::record::title_case;

/// How a recognized label's value side is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Verbatim,
    /// Digit run only (Age, Quantity, Pincode).
    Digits,
    /// Numeric literal with thousands separators stripped (Amount).
    Money,
}

/// Synonym → canonical core field. Labels not listed here are kept
/// verbatim (Title-Cased) as dynamic fields, which is how the schema
/// grows over time.
const CANONICAL_LABELS: &[(&str, &str, ValueKind)] = &[
    ("name", "Name", ValueKind::Verbatim),
    ("age", "Age", ValueKind::Digits),
    ("gender", "Gender", ValueKind::Verbatim),
    ("city", "City", ValueKind::Verbatim),
    ("state", "State", ValueKind::Verbatim),
    ("street", "Street", ValueKind::Verbatim),
    ("country", "Country", ValueKind::Verbatim),
    ("pincode", "Pincode", ValueKind::Digits),
    ("pin code", "Pincode", ValueKind::Digits),
    ("postal code", "Pincode", ValueKind::Digits),
    ("company", "Company", ValueKind::Verbatim),
    ("organization", "Company", ValueKind::Verbatim),
    ("product", "Product", ValueKind::Verbatim),
    ("service", "Product", ValueKind::Verbatim),
    ("product/service", "Product", ValueKind::Verbatim),
    ("amount", "Amount", ValueKind::Money),
    ("price", "Amount", ValueKind::Money),
    ("total", "Amount", ValueKind::Money),
    ("order amount", "Amount", ValueKind::Money),
    ("quantity", "Quantity", ValueKind::Digits),
    ("qty", "Quantity", ValueKind::Digits),
    ("phone", "Phone", ValueKind::Verbatim),
    ("mobile", "Phone", ValueKind::Verbatim),
    ("email", "Email", ValueKind::Verbatim),
    ("notes", "Notes", ValueKind::Verbatim),
];

/// Split input into lines and read `label: value` shapes. Lines without
/// a `:` are ignored here (they survive through the Notes field).
pub fn parse(text: &str) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    for line in text.lines() {
        let Some((raw_label, raw_value)) = line.split_once(':') else {
            continue;
        };
        let label = raw_label.trim();
        let value = raw_value.trim();
        if label.is_empty() || value.is_empty() {
            continue;
        }

        let lower = label.to_lowercase();
        let (field, value) = match CANONICAL_LABELS.iter().find(|(l, _, _)| *l == lower) {
            Some((_, canonical, kind)) => (canonical.to_string(), normalize(value, *kind)),
            None => (title_case(label), value.to_string()),
        };
        fields.push((field, value));
    }
    fields
}

/// Numeric-bearing labels keep only the embedded digit run; a value with
/// no digits falls back to the trimmed raw string rather than dropping.
fn normalize(value: &str, kind: ValueKind) -> String {
    let extracted = match kind {
        ValueKind::Verbatim => return value.to_string(),
        ValueKind::Digits => patterns::digits_in(value),
        ValueKind::Money => patterns::amount_in(value),
    };
    extracted.unwrap_or_else(|| value.to_string())
}
