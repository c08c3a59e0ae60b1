//! Detection capability implementations.
//!
//! Each backend implements [`Detector`](crate::Detector).
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │ Model source: HeuristicDetector                     │
//! │   PERSON / ORG / GPE via capitalization + cues      │
//! │   stand-in for a statistical NER model              │
//! ├─────────────────────────────────────────────────────┤
//! │ Pattern source: PatternDetector                     │
//! │   EMAIL / PHONE / SSN / DATE_PATTERN / CREDIT_CARD  │
//! │   ZIP_CODE / ADDRESS / URL                          │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! On overlap the pattern source always wins; see
//! [`SpanResolver`](crate::SpanResolver).
//!
//! ```rust
//! use spanguard::{Detector, PatternDetector};
//!
//! let found = PatternDetector::new().detect("SSN 123-45-6789").unwrap();
//! assert_eq!(found[0].label, "SSN");
//! ```

pub mod heuristic;
pub mod pattern;
pub mod pattern_config;

pub use heuristic::HeuristicDetector;
pub use pattern::PatternDetector;
