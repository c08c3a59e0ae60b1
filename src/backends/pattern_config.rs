//! Declarative PII pattern table.
//!
//! Patterns are defined once and compiled lazily. The order of [`PATTERNS`]
//! is the enumeration order the resolver relies on: within the pattern
//! source, an earlier pattern wins every overlap against a later one.

use once_cell::sync::Lazy;
use regex::Regex;

/// A pattern definition: label + compiled regex.
pub struct PatternDef {
    /// Label assigned to matches.
    pub label: &'static str,
    /// The compiled regex pattern.
    pub regex: &'static Lazy<Regex>,
}

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("EMAIL regex")
});

// Optional +1, optional area code, 3 + 4 digits.
static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?:\+?1[ -]?)?",
        r"(?:\(?\d{3}\)?[-. ]?)?",
        r"\d{3}[-. ]?",
        r"\d{4}",
        r"\b",
    ))
    .expect("PHONE regex")
});

static SSN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}-?\d{2}-?\d{4}\b").expect("SSN regex"));

const MONTH: &str = "(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|Jun(?:e)?|Jul(?:y)?\
|Aug(?:ust)?|Sep(?:tember)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)";

static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let alternatives = [
        r"\d{4}-\d{1,2}-\d{1,2}".to_string(),
        r"\d{1,2}[/-]\d{1,2}[/-]\d{2,4}".to_string(),
        format!(r"{MONTH}\s+\d{{1,2}},\s+\d{{4}}"),
        format!(r"\d{{1,2}}\s+{MONTH},\s+\d{{4}}"),
    ];
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|"))).expect("DATE_PATTERN regex")
});

// 16 digits in groups of four, or the 4-6-5 Amex layout.
static CREDIT_CARD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:(?:\d{4}[- ]?){3}\d{4}|\d{4}[- ]?\d{6}[- ]?\d{5})\b")
        .expect("CREDIT_CARD regex")
});

static ZIP_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{5}(?:-\d{4})?\b").expect("ZIP_CODE regex"));

const US_STATE: &str = "(?:AL|AK|AZ|AR|CA|CO|CT|DE|DC|FL|GA|HI|ID|IL|IN|IA|KS|KY|LA|ME|MD|MA|MI|MN\
|MS|MO|MT|NE|NV|NH|NJ|NM|NY|NC|ND|OH|OK|OR|PA|RI|SC|SD|TN|TX|UT|VT|VA|WA|WV|WI|WY)";

static ADDRESS: Lazy<Regex> = Lazy::new(|| {
    let pattern = [
        r"\b",
        r"\d+\s+",                                         // street number
        r"(?:[A-Z][a-zA-Z'.-]+\s+)+",                      // street name
        r"(?:(?:Suite|Apt|Unit|Bldg|Floor)\.?\s+[\w-]+)?", // unit
        r",?\s*",
        r"[A-Z][a-zA-Z.-]+(?:\s+[A-Z][a-zA-Z.-]+)*?,?\s*", // city
        US_STATE,
        r"\s+",
        r"\d{5}(?:-\d{4})?",
        r"\b",
    ]
    .concat();
    Regex::new(&pattern).expect("ADDRESS regex")
});

static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\b(?:(?:https?|ftp)://|www\.)",
        r"[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b",
        r"(?:[-a-zA-Z0-9()@:%_+.~#?&/=]*)",
    ))
    .expect("URL regex")
});

/// All pattern definitions, in resolution priority order.
pub static PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        PatternDef { label: "EMAIL", regex: &EMAIL },
        PatternDef { label: "PHONE", regex: &PHONE },
        PatternDef { label: "SSN", regex: &SSN },
        PatternDef { label: "DATE_PATTERN", regex: &DATE_PATTERN },
        PatternDef { label: "CREDIT_CARD", regex: &CREDIT_CARD },
        PatternDef { label: "ZIP_CODE", regex: &ZIP_CODE },
        PatternDef { label: "ADDRESS", regex: &ADDRESS },
        PatternDef { label: "URL", regex: &URL },
    ]
});

/// Look up a pattern by label.
#[must_use]
pub fn get_pattern(label: &str) -> Option<&'static PatternDef> {
    PATTERNS.iter().find(|p| p.label == label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(label: &str, text: &str) -> Vec<String> {
        get_pattern(label)
            .unwrap()
            .regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_all_patterns_compile() {
        for def in PATTERNS.iter() {
            let _ = def.regex.as_str();
        }
        assert_eq!(PATTERNS.len(), 8);
        assert_eq!(PATTERNS[0].label, "EMAIL");
        assert_eq!(PATTERNS[7].label, "URL");
    }

    #[test]
    fn test_email() {
        assert_eq!(matches("EMAIL", "reach jane.doe+x@mail.example.org now"), vec!["jane.doe+x@mail.example.org"]);
    }

    #[test]
    fn test_phone() {
        assert_eq!(matches("PHONE", "call 555-123-4567."), vec!["555-123-4567"]);
        assert_eq!(matches("PHONE", "call (555) 123-4567"), vec!["(555) 123-4567"]);
    }

    #[test]
    fn test_ssn() {
        assert_eq!(matches("SSN", "SSN: 999-00-1111."), vec!["999-00-1111"]);
    }

    #[test]
    fn test_dates() {
        assert_eq!(matches("DATE_PATTERN", "on 2024-01-15"), vec!["2024-01-15"]);
        assert_eq!(matches("DATE_PATTERN", "on 12/31/1999"), vec!["12/31/1999"]);
        assert_eq!(matches("DATE_PATTERN", "born march 3, 1990"), vec!["march 3, 1990"]);
        assert_eq!(matches("DATE_PATTERN", "born 3 Mar, 1990"), vec!["3 Mar, 1990"]);
    }

    #[test]
    fn test_credit_card() {
        assert_eq!(matches("CREDIT_CARD", "card 4532 0151 1283 0366 ok"), vec!["4532 0151 1283 0366"]);
        assert_eq!(matches("CREDIT_CARD", "amex 3782-822463-10005"), vec!["3782-822463-10005"]);
    }

    #[test]
    fn test_zip() {
        assert_eq!(matches("ZIP_CODE", "zip 94105-1234"), vec!["94105-1234"]);
    }

    #[test]
    fn test_address() {
        let found = matches("ADDRESS", "Ship to 500 Oak Avenue Suite 12, Springfield, IL 62704 today");
        assert_eq!(found, vec!["500 Oak Avenue Suite 12, Springfield, IL 62704"]);
    }

    #[test]
    fn test_url() {
        assert_eq!(matches("URL", "see https://example.com/a?b=1 now"), vec!["https://example.com/a?b=1"]);
        assert_eq!(matches("URL", "see www.example.org"), vec!["www.example.org"]);
    }
}
