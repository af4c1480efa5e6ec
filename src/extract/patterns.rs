use std::sync::LazyLock;

use regex::Regex;

// Phone: optional +country prefix, then 8/9/10 contiguous digits.
// The 10-digit alternative is listed first so it wins when present.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\+\d{1,3}[\s\-]?)?(\d{10}|\d{9}|\d{8})").unwrap());
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());
// Marked amount: currency cue then a numeric literal.
static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:₹|Rs\.?|INR|\$)\s*([0-9]{1,3}(?:,[0-9]{3})+(?:\.[0-9]+)?|[0-9]{1,3}(?:\.[0-9]{3}){2,}|[0-9]+(?:\.[0-9]+)?)").unwrap()
});
// Bare amount: no currency cue, so require a thousands separator or a
// decimal part. Undecorated integers stay free for age/pincode/phone.
static BARE_AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([0-9]{1,3}(?:,[0-9]{3})+(?:\.[0-9]+)?|[0-9]{1,3}(?:\.[0-9]{3}){2,}|[0-9]+\.[0-9]+)\b").unwrap()
});
// Any numeric literal; used on the value side of numeric-bearing labels,
// where the label itself is the intent signal.
static NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]{1,3}(?:,[0-9]{3})+(?:\.[0-9]+)?|[0-9]{1,3}(?:\.[0-9]{3}){2,}|[0-9]+(?:\.[0-9]+)?").unwrap()
});
static DOT_GROUPED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,3}(?:\.[0-9]{3}){2,}$").unwrap());
// Postal code: a word-bounded 5-6 digit run. 7+ digit runs never match,
// which keeps phone numbers out of this family.
static PIN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{5,6})\b").unwrap());
static AGE_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bage[\s:\-]*(\d{1,3})\b").unwrap());
static AGE_UNIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{2})\s*(?:years|yrs|y/o|yo)\b").unwrap());
static DATE_ISO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4}-\d{2}-\d{2})\b").unwrap());
static DATE_SLASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})\b").unwrap());
static DATE_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b((?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]* \d{1,2}, \d{4})\b")
        .unwrap()
});
// Same-line whitespace only in the capture groups below: a claimed
// value must never swallow the start of the next line.
static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:Name|name)[ \t:\-]+([A-Z][a-z]+(?:[ \t][A-Z][a-z]+){0,2})").unwrap()
});
static COMPANY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:Company|Co\.|Pvt|Ltd|LLP|LLC|Corporation|Inc)[ \t]*[:\-]?[ \t]*([A-Z][A-Za-z0-9&]*(?:[ \t][A-Z][A-Za-z0-9&]*)*)",
    )
    .unwrap()
});
static CITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:[Cc]ity|from|at|in)[ \t]+([A-Z][a-zA-Z]+(?:[ \t][A-Z][a-zA-Z]+){0,2})")
        .unwrap()
});
static FEMALE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bfemale\b").unwrap());
static MALE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bmale\b").unwrap());
static TRANS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\btrans(?:gender)?\b").unwrap());

pub fn phone(text: &str) -> Option<String> {
    PHONE_RE.captures(text).map(|c| c[1].to_string())
}

pub fn email(text: &str) -> Option<String> {
    EMAIL_RE.find(text).map(|m| m.as_str().to_string())
}

pub fn amount(text: &str) -> Option<String> {
    AMOUNT_RE
        .captures(text)
        .or_else(|| BARE_AMOUNT_RE.captures(text))
        .map(|c| normalize_amount(&c[1]))
}

/// Numeric literal anywhere in a label's value side ("Rs 1,250.50" → "1250.50").
pub fn amount_in(value: &str) -> Option<String> {
    NUMERIC_RE.find(value).map(|m| normalize_amount(m.as_str()))
}

/// First plain digit run in a label's value side ("34 yrs" → "34").
pub fn digits_in(value: &str) -> Option<String> {
    static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
    DIGITS_RE.find(value).map(|m| m.as_str().to_string())
}

pub fn pincode(text: &str) -> Option<String> {
    PIN_RE.captures(text).map(|c| c[1].to_string())
}

pub fn age(text: &str) -> Option<String> {
    AGE_LABEL_RE
        .captures(text)
        .or_else(|| AGE_UNIT_RE.captures(text))
        .map(|c| c[1].to_string())
}

pub fn date(text: &str) -> Option<String> {
    DATE_ISO_RE
        .captures(text)
        .or_else(|| DATE_SLASH_RE.captures(text))
        .or_else(|| DATE_MONTH_RE.captures(text))
        .map(|c| c[1].to_string())
}

pub fn name(text: &str) -> Option<String> {
    NAME_RE.captures(text).map(|c| c[1].trim().to_string())
}

pub fn company(text: &str) -> Option<String> {
    COMPANY_RE
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn city(text: &str) -> Option<String> {
    CITY_RE.captures(text).map(|c| c[1].trim().to_string())
}

pub fn gender(text: &str) -> Option<String> {
    // female before male: the substring would otherwise claim it
    if FEMALE_RE.is_match(text) {
        Some("Female".into())
    } else if TRANS_RE.is_match(text) {
        Some("Trans".into())
    } else if MALE_RE.is_match(text) {
        Some("Male".into())
    } else {
        None
    }
}

/// Run every pattern family over the input, first match per family.
/// Absence of a match omits the field; nothing here is an error.
pub fn candidates(text: &str) -> Vec<(&'static str, String)> {
    let families: [(&'static str, fn(&str) -> Option<String>); 10] = [
        ("Name", name),
        ("Age", age),
        ("Gender", gender),
        ("Phone", phone),
        ("Email", email),
        ("City", city),
        ("Pincode", pincode),
        ("Company", company),
        ("Amount", amount),
        ("Date", date),
    ];
    families
        .iter()
        .filter_map(|(field, f)| f(text).map(|v| (*field, v)))
        .collect()
}

/// Strip thousands separators, keep the decimal point. Commas always
/// strip; dots strip only in multi-group form ("1.250.000").
fn normalize_amount(raw: &str) -> String {
    let no_commas = raw.replace(',', "");
    if DOT_GROUPED_RE.is_match(raw) {
        no_commas.replace('.', "")
    } else {
        no_commas
    }
}
