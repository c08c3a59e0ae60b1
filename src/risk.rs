//! Base risk scores and sensitivity classes per entity label.
//!
//! Both tables are immutable and built once on first use.

use crate::entity::Sensitivity;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Score for labels missing from the table.
pub const UNKNOWN_RISK: f64 = 0.0;

static BASE_RISK_SCORES: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        // Pattern labels
        ("EMAIL", 0.8),
        ("PHONE", 0.7),
        ("SSN", 1.0),
        ("DATE_PATTERN", 0.5),
        ("CREDIT_CARD", 1.0),
        ("ZIP_CODE", 0.4),
        ("ADDRESS", 0.7),
        // Model labels
        ("PERSON", 0.6),
        ("ORG", 0.3),
        ("GPE", 0.2),
        ("LOC", 0.3),
        ("DATE", 0.5),
        ("TIME", 0.1),
        ("MONEY", 0.6),
        ("PERCENT", 0.05),
        ("FAC", 0.2),
        ("PRODUCT", 0.05),
        ("EVENT", 0.2),
        ("WORK_OF_ART", 0.05),
        ("LAW", 0.1),
        ("LANGUAGE", 0.0),
        ("NORP", 0.4),
        ("QUANTITY", 0.05),
        ("ORDINAL", 0.05),
        ("CARDINAL", 0.05),
        ("UNKNOWN", UNKNOWN_RISK),
    ])
});

/// Labels that identify an individual on their own.
const EXPLICIT_LABELS: &[&str] = &["EMAIL", "PHONE", "SSN", "CREDIT_CARD"];

/// Base risk for a label. Case-insensitive; unmapped labels score
/// [`UNKNOWN_RISK`].
#[must_use]
pub fn assign_base_risk(label: &str) -> f64 {
    BASE_RISK_SCORES
        .get(label.to_uppercase().as_str())
        .copied()
        .unwrap_or(UNKNOWN_RISK)
}

/// Sensitivity class for a label, without element context.
#[must_use]
pub fn classify_sensitivity(label: &str) -> Sensitivity {
    if EXPLICIT_LABELS.contains(&label) {
        Sensitivity::ExplicitIdentifier
    } else {
        Sensitivity::QuasiIdentifier
    }
}
