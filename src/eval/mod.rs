//! Span-level evaluation of resolved entities against labeled ground truth.
//!
//! # Overview
//!
//! ```text
//! tokens + BIO tags ──► bio_adapter ──► GroundTruthEntity (char offsets)
//!                                              │
//! SpanResolver ──► Entity ─────────────► matching (exact | overlap)
//!                                              │
//!                                       LabelCounts per label
//!                                              │
//!                               aggregate (raw counts | approximate)
//!                                              │
//!                                       EvaluationReport
//! ```
//!
//! # Element-level evaluation
//!
//! ```rust
//! use spanguard::eval::{evaluate_element, EvaluationReport, GroundTruthEntity, LabelMap, MatchStrategy};
//! use spanguard::{Element, SpanResolver};
//!
//! let element = Element::new("e0", "Mail bob@example.com today.");
//! let predictions = SpanResolver::default().detect_element(&element).unwrap();
//! let gold = vec![GroundTruthEntity::new("EMAIL", 5, 20, "bob@example.com")];
//!
//! let outcome = evaluate_element(&predictions, &gold, MatchStrategy::Exact, &LabelMap::identity());
//! let report = EvaluationReport::from_counts(outcome.counts());
//! assert_eq!(report.per_class["EMAIL"].f1, 1.0);
//! ```
//!
//! # Corpus evaluation
//!
//! [`corpus::evaluate_corpus`] drives the whole pipeline over a JSONL corpus
//! of `{document, tokens, labels, trailing_whitespace, full_text}` rows,
//! evaluating documents in parallel.
//!
//! # Metrics
//!
//! - Precision, recall and F1 per label and overall (micro, over summed counts)
//! - Support is `tp + fn`
//! - Zero denominators yield 0, never NaN

pub mod aggregate;
pub mod bio_adapter;
pub mod corpus;
pub mod label_map;
pub mod matching;
pub mod metrics;
pub mod types;

pub use aggregate::{aggregate, aggregate_approximate, aggregate_raw, approximate_counts, AggregationMode};
pub use bio_adapter::{convert_bio_lossy, convert_bio_to_offsets, ConversionError};
pub use corpus::{
    evaluate_corpus, evaluate_document, map_ground_truth_to_elements, Corpus, CorpusEvaluation,
    CorpusRow, DocumentResult, EvalDiagnostics, EvalOptions, RowRejection,
};
pub use label_map::LabelMap;
pub use matching::{evaluate_element, merge_counts, MatchOutcome, MatchStrategy, DEFAULT_OVERLAP_THRESHOLD};
pub use metrics::{EvaluationReport, Metrics};
pub use types::{FractionalCounts, GroundTruthEntity, LabelCounts};
