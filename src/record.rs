/// Fields every record starts from, in export order. Labels observed at
/// runtime grow the schema past this list but never reorder it.
pub const CORE_FIELDS: &[&str] = &[
    "Captured At",
    "Name",
    "Age",
    "Gender",
    "Phone",
    "Email",
    "Street",
    "City",
    "State",
    "Pincode",
    "Country",
    "Company",
    "Product",
    "Quantity",
    "Amount",
    "Notes",
];

/// One extracted record: field name → value, first-insertion order.
/// Each name appears at most once.
#[derive(Debug, Clone, Default)]
pub struct ExtractedRecord {
    fields: Vec<(String, String)>,
}

impl ExtractedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    /// Insert or overwrite a field, keeping its original position if present.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Insert only if the field is not already set. Returns whether it landed.
    pub fn set_if_absent(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.fields.push((name, value.into()));
        true
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// Title-case a label: uppercase each letter that follows a non-letter,
/// lowercase the rest. "order amount" → "Order Amount", "GST no" → "Gst No".
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_if_absent_keeps_first_value() {
        let mut r = ExtractedRecord::new();
        assert!(r.set_if_absent("Name", "Ravi"));
        assert!(!r.set_if_absent("Name", "Someone Else"));
        assert_eq!(r.get("Name"), Some("Ravi"));
    }

    #[test]
    fn set_overwrites_in_place() {
        let mut r = ExtractedRecord::new();
        r.set("Name", "Ravi");
        r.set("City", "Pune");
        r.set("Name", "Ravi Kumar");
        let names: Vec<&str> = r.field_names().collect();
        assert_eq!(names, vec!["Name", "City"]);
        assert_eq!(r.get("Name"), Some("Ravi Kumar"));
    }

    #[test]
    fn insertion_order_preserved() {
        let mut r = ExtractedRecord::new();
        r.set("B", "2");
        r.set("A", "1");
        r.set("C", "3");
        let names: Vec<&str> = r.field_names().collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn title_case_labels() {
        assert_eq!(title_case("name"), "Name");
        assert_eq!(title_case("order amount"), "Order Amount");
        assert_eq!(title_case("GST no"), "Gst No");
        assert_eq!(title_case("invoice-id"), "Invoice-Id");
    }
}
