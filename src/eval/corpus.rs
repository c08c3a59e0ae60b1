//! Corpus evaluation driver.
//!
//! ```text
//! CorpusRow ──► segment ──► resolve (per element)
//!     │                           │
//!     └─► BIO ──► ground truth    │
//!              (document coords)  │
//!                   │             │
//!                   ▼             ▼
//!          map into element coords ──► match ──► per-document counts
//!                                                        │
//!                              rayon: documents in parallel
//!                                                        ▼
//!                                         aggregate ──► EvaluationReport
//! ```
//!
//! Rows that do not parse or whose sequences differ in length, documents
//! whose tokens cannot be aligned, and elements that cannot be located in
//! the source text are recorded in [`EvalDiagnostics`] rather than being
//! silently scored.

use super::aggregate::{aggregate, AggregationMode};
use super::bio_adapter::convert_bio_to_offsets;
use super::label_map::LabelMap;
use super::matching::{evaluate_element, merge_counts, MatchStrategy, DEFAULT_OVERLAP_THRESHOLD};
use super::metrics::EvaluationReport;
use super::types::{GroundTruthEntity, LabelCounts};
use crate::document::{Document, Element};
use crate::offset::{char_len, slice_chars, SpanConverter};
use crate::resolver::SpanResolver;
use crate::{Error, Result};
use rayon::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use thiserror::Error as ThisError;

/// One labeled document.
///
/// Field aliases accept the Kaggle PII corpus layout (`labels`,
/// `full_text`, numeric `document`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusRow {
    /// Document identifier.
    #[serde(alias = "document_id", deserialize_with = "document_id")]
    pub document: String,
    /// Tokens in text order.
    pub tokens: Vec<String>,
    /// One BIO tag per token.
    #[serde(alias = "labels")]
    pub tags: Vec<String>,
    /// Whether each token is followed by whitespace.
    pub trailing_whitespace: Vec<bool>,
    /// Raw document text.
    #[serde(alias = "full_text")]
    pub text: String,
}

fn document_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }
    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

/// Why a row was excluded before evaluation.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum RowRejection {
    /// `tokens`, `tags` and `trailing_whitespace` differ in length.
    #[error("document {document}: {tokens} tokens, {tags} tags, {trailing_whitespace} whitespace flags")]
    LengthMismatch {
        /// Document identifier.
        document: String,
        /// Number of tokens.
        tokens: usize,
        /// Number of tags.
        tags: usize,
        /// Number of whitespace flags.
        trailing_whitespace: usize,
    },
    /// The row is not a valid corpus record.
    #[error("line {line}: {message}")]
    Unparseable {
        /// 1-based line, or 1-based position within a JSON array.
        line: usize,
        /// Parser message.
        message: String,
    },
}

impl RowRejection {
    /// Identifier of the rejected document, if the row got far enough to
    /// have one.
    #[must_use]
    pub fn document(&self) -> Option<&str> {
        match self {
            RowRejection::LengthMismatch { document, .. } => Some(document),
            RowRejection::Unparseable { .. } => None,
        }
    }

    fn unparseable(line: usize, err: &serde_json::Error) -> Self {
        RowRejection::Unparseable {
            line,
            message: err.to_string(),
        }
    }
}

impl CorpusRow {
    /// Check that the three sequences have equal length.
    pub fn validate(&self) -> std::result::Result<(), RowRejection> {
        let (tokens, tags, ws) = (self.tokens.len(), self.tags.len(), self.trailing_whitespace.len());
        if tokens == tags && tags == ws {
            Ok(())
        } else {
            Err(RowRejection::LengthMismatch {
                document: self.document.clone(),
                tokens,
                tags,
                trailing_whitespace: ws,
            })
        }
    }
}

/// Validated rows plus the rows that were turned away.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    /// Rows that passed validation, in file order.
    pub rows: Vec<CorpusRow>,
    /// Rows excluded from evaluation.
    pub rejected: Vec<RowRejection>,
}

impl Corpus {
    /// Validate rows, keeping the good ones.
    #[must_use]
    pub fn from_rows(rows: impl IntoIterator<Item = CorpusRow>) -> Self {
        let mut corpus = Corpus::default();
        for row in rows {
            corpus.push(row);
        }
        corpus
    }

    fn push(&mut self, row: CorpusRow) {
        match row.validate() {
            Ok(()) => self.rows.push(row),
            Err(rejection) => self.reject(rejection),
        }
    }

    fn reject(&mut self, rejection: RowRejection) {
        log::warn!("skipping malformed row: {rejection}");
        self.rejected.push(rejection);
    }

    /// Parse a corpus from JSON Lines, or from a single JSON array.
    ///
    /// Blank lines are skipped. A row that does not deserialize is recorded
    /// as [`RowRejection::Unparseable`] and the remaining rows still load.
    ///
    /// # Errors
    ///
    /// A JSON array input that is not valid JSON as a whole.
    pub fn parse(content: &str) -> Result<Self> {
        let mut corpus = Corpus::default();
        if content.trim_start().starts_with('[') {
            let values: Vec<serde_json::Value> = serde_json::from_str(content)
                .map_err(|e| Error::dataset(format!("corpus is not a JSON array: {e}")))?;
            for (i, value) in values.into_iter().enumerate() {
                match serde_json::from_value::<CorpusRow>(value) {
                    Ok(row) => corpus.push(row),
                    Err(e) => corpus.reject(RowRejection::unparseable(i + 1, &e)),
                }
            }
            return Ok(corpus);
        }
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<CorpusRow>(line) {
                Ok(row) => corpus.push(row),
                Err(e) => corpus.reject(RowRejection::unparseable(i + 1, &e)),
            }
        }
        Ok(corpus)
    }

    /// Load a corpus file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let corpus = Self::parse(&content)?;
        log::info!(
            "loaded {} rows from {} ({} rejected)",
            corpus.rows.len(),
            path.display(),
            corpus.rejected.len()
        );
        Ok(corpus)
    }

    /// Number of valid rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if no valid rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Ground truth re-based onto elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappedGroundTruth {
    /// One list per element, in element order, in element-local offsets.
    pub per_element: Vec<Vec<GroundTruthEntity>>,
    /// Elements whose text does not occur verbatim in the document text.
    pub unmapped_elements: usize,
}

/// Re-base document-level ground truth onto elements.
///
/// An element is located at the first occurrence of its text in `text`. An
/// entity maps to it if it starts inside the element, ends within it, and
/// the element-local substring equals the entity text.
#[must_use]
pub fn map_ground_truth_to_elements(
    text: &str,
    elements: &[Element],
    ground_truth: &[GroundTruthEntity],
) -> MappedGroundTruth {
    let converter = SpanConverter::new(text);
    let mut mapped = MappedGroundTruth::default();

    for element in elements {
        let Some(byte_start) = text.find(&element.text) else {
            log::debug!("element {} not found verbatim in document text", element.id);
            mapped.unmapped_elements += 1;
            mapped.per_element.push(Vec::new());
            continue;
        };
        let elem_start = converter.byte_to_char(byte_start);
        let elem_end = elem_start + char_len(&element.text);

        let local = ground_truth
            .iter()
            .filter(|g| elem_start <= g.start() && g.start() < elem_end && g.end() <= elem_end)
            .filter_map(|g| {
                let (start, end) = (g.start() - elem_start, g.end() - elem_start);
                (slice_chars(&element.text, start, end) == Some(g.text.as_str()))
                    .then(|| GroundTruthEntity::new(g.label.clone(), start, end, g.text.clone()))
            })
            .collect();
        mapped.per_element.push(local);
    }
    mapped
}

/// Evaluation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalOptions {
    /// Matching strategy.
    pub strategy: MatchStrategy,
    /// Ground-truth label remap.
    pub label_map: LabelMap,
    /// Cross-document aggregation.
    pub aggregation: AggregationMode,
    /// Evaluate only the first `n` valid rows.
    pub limit: Option<usize>,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            strategy: MatchStrategy::Overlap {
                threshold: DEFAULT_OVERLAP_THRESHOLD,
            },
            label_map: LabelMap::kaggle_default(),
            aggregation: AggregationMode::RawCounts,
            limit: None,
        }
    }
}

/// Outcome for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentResult {
    /// Document identifier.
    pub document: String,
    /// Per-label counts summed over elements.
    pub counts: BTreeMap<String, LabelCounts>,
    /// Ground truth could not be aligned; it was treated as empty.
    pub alignment_failed: bool,
    /// Elements not located in the document text.
    pub unmapped_elements: usize,
    /// Pattern card candidates dropped for failing the Luhn check.
    pub checksum_rejections: usize,
}

/// Detect, convert, map and match one document.
///
/// # Errors
///
/// Propagates detector failures. Alignment failures are not errors; they
/// are flagged on the result.
pub fn evaluate_document(
    resolver: &SpanResolver,
    row: &CorpusRow,
    options: &EvalOptions,
) -> Result<DocumentResult> {
    let mut document = Document::from_text(row.document.clone(), &row.text);
    let mut checksum_rejections = 0;
    for element in &mut document.elements {
        let resolution = resolver.resolve_element(element)?;
        checksum_rejections += resolution.checksum_failures();
        element.entities = resolution.entities;
    }

    let (gold, alignment_failed) =
        match convert_bio_to_offsets(&row.tokens, &row.tags, &row.trailing_whitespace, &row.text) {
            Ok(gold) => (gold, false),
            Err(e) => {
                log::warn!("document {}: ground truth discarded: {e}", row.document);
                (Vec::new(), true)
            }
        };

    let mapped = map_ground_truth_to_elements(&row.text, &document.elements, &gold);
    let mut counts = BTreeMap::new();
    for (element, element_gold) in document.elements.iter().zip(&mapped.per_element) {
        let outcome = evaluate_element(&element.entities, element_gold, options.strategy, &options.label_map);
        merge_counts(&mut counts, outcome.counts());
    }

    Ok(DocumentResult {
        document: row.document.clone(),
        counts,
        alignment_failed,
        unmapped_elements: mapped.unmapped_elements,
        checksum_rejections,
    })
}

/// What happened to the corpus besides scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalDiagnostics {
    /// Documents that were scored (including alignment failures).
    pub evaluated: usize,
    /// Documents whose ground truth could not be aligned and was empty.
    pub token_alignment_failures: Vec<String>,
    /// Documents excluded for mismatched sequence lengths.
    pub malformed_rows: Vec<String>,
    /// Lines (or array positions) that did not parse as rows.
    pub unparseable_rows: Vec<usize>,
    /// Elements whose ground truth could not be located, over all documents.
    pub unmapped_elements: usize,
    /// Pattern card candidates dropped by the Luhn check. Expected on real
    /// data, so it does not make a run unclean.
    pub checksum_rejections: usize,
}

impl EvalDiagnostics {
    /// True if nothing was skipped or degraded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.token_alignment_failures.is_empty()
            && self.malformed_rows.is_empty()
            && self.unparseable_rows.is_empty()
            && self.unmapped_elements == 0
    }
}

impl fmt::Display for EvalDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "evaluated {} documents; {} alignment failures; {} malformed rows; \
             {} unparseable rows; {} unmapped elements; {} checksum rejections",
            self.evaluated,
            self.token_alignment_failures.len(),
            self.malformed_rows.len(),
            self.unparseable_rows.len(),
            self.unmapped_elements,
            self.checksum_rejections
        )
    }
}

/// Report plus diagnostics for a corpus run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusEvaluation {
    /// Strategy the run used.
    pub strategy: MatchStrategy,
    /// Aggregation the run used.
    pub aggregation: AggregationMode,
    /// Aggregated metrics.
    pub report: EvaluationReport,
    /// Non-fatal outcomes.
    pub diagnostics: EvalDiagnostics,
}

impl CorpusEvaluation {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Evaluate every valid row of `corpus`, documents in parallel.
///
/// # Example
///
/// ```rust
/// use spanguard::eval::corpus::{evaluate_corpus, Corpus, CorpusRow, EvalOptions};
/// use spanguard::SpanResolver;
///
/// let row = CorpusRow {
///     document: "1".into(),
///     tokens: vec!["Mail".into(), "a@b.io".into()],
///     tags: vec!["O".into(), "B-EMAIL".into()],
///     trailing_whitespace: vec![true, false],
///     text: "Mail a@b.io".into(),
/// };
/// let corpus = Corpus::from_rows(vec![row]);
/// let result = evaluate_corpus(&SpanResolver::default(), &corpus, &EvalOptions::default()).unwrap();
/// assert_eq!(result.report.per_class["EMAIL"].f1, 1.0);
/// ```
pub fn evaluate_corpus(
    resolver: &SpanResolver,
    corpus: &Corpus,
    options: &EvalOptions,
) -> Result<CorpusEvaluation> {
    let take = options.limit.map_or(corpus.rows.len(), |n| n.min(corpus.rows.len()));
    let rows = &corpus.rows[..take];

    let results: Vec<DocumentResult> = rows
        .par_iter()
        .map(|row| evaluate_document(resolver, row, options))
        .collect::<Result<_>>()?;

    let report = aggregate(options.aggregation, results.iter().map(|r| &r.counts));
    let diagnostics = EvalDiagnostics {
        evaluated: results.len(),
        token_alignment_failures: results
            .iter()
            .filter(|r| r.alignment_failed)
            .map(|r| r.document.clone())
            .collect(),
        malformed_rows: corpus
            .rejected
            .iter()
            .filter_map(|r| r.document().map(str::to_string))
            .collect(),
        unparseable_rows: corpus
            .rejected
            .iter()
            .filter_map(|r| match r {
                RowRejection::Unparseable { line, .. } => Some(*line),
                RowRejection::LengthMismatch { .. } => None,
            })
            .collect(),
        unmapped_elements: results.iter().map(|r| r.unmapped_elements).sum(),
        checksum_rejections: results.iter().map(|r| r.checksum_rejections).sum(),
    };

    log::info!(
        "corpus evaluation ({}, {}): overall F1 = {:.4}; {}",
        options.strategy,
        options.aggregation,
        report.overall.f1,
        diagnostics
    );

    Ok(CorpusEvaluation {
        strategy: options.strategy,
        aggregation: options.aggregation,
        report,
        diagnostics,
    })
}
