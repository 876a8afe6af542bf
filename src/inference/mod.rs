//! CSV column type inference
//!
//! Classifies a column from raw string samples, trying specific patterns in
//! strict order of specificity: ISO date, ISO date-time, boolean tokens,
//! integer, decimal, UUID shape, then a length-based text fallback. Every
//! sampled value must match before a classification is accepted; a single
//! non-match falls through to the next, less specific check.
//!
//! The inferrer never fails: empty input, empty strings, unicode, and
//! special characters all resolve to a valid result, worst case short text
//! at low confidence.

mod patterns;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::reason::build_reason_codes;
use crate::types::{
    CanonicalType, MappingResult, MappingWarning, ReasonCode, confidence,
};

/// Columns whose samples are mostly empty carry the MOSTLY_EMPTY flag.
/// Tunable: the ratio of empty/whitespace samples above which the flag is set.
pub const EMPTY_SAMPLE_THRESHOLD: f64 = 0.5;

/// Average sample length at or above which the fallback is long text
const LONG_TEXT_AVG_LENGTH: f64 = 100.0;

/// At most this many distinct values reads as an enum candidate
const LOW_DISTINCT_MAX: usize = 10;

/// Distinct-to-total ratio at or above which a column reads as free text
const HIGH_DISTINCT_RATIO: f64 = 0.9;

/// Minimum sample count before the high-distinct heuristic applies
const HIGH_DISTINCT_MIN_SAMPLES: usize = 10;

/// UUID-shaped samples are certain about the shape but not the reference
/// semantics; sits between SEMANTIC_EQUIV (0.95) and
/// NARROWING_WITH_METADATA (0.8).
const UUID_SHAPE_CONFIDENCE: f64 = 0.9;

/// How samples are drawn when a sample size is set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleStrategy {
    /// The first N values
    #[default]
    First,
    /// N values evenly spaced across the input
    Spread,
}

/// Sampling controls for [`infer_column_type`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceOptions {
    /// Maximum number of values to examine (0 = all)
    pub sample_size: usize,
    /// How samples are drawn; deterministic strategies only
    pub sample_strategy: SampleStrategy,
}

impl InferenceOptions {
    /// Options with default values (all samples)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sample size (0 = all)
    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size;
        self
    }

    /// Set the sampling strategy
    pub fn with_sample_strategy(mut self, strategy: SampleStrategy) -> Self {
        self.sample_strategy = strategy;
        self
    }
}

fn sample<'a>(values: &'a [String], opts: &InferenceOptions) -> Vec<&'a str> {
    let n = opts.sample_size;
    if n == 0 || n >= values.len() {
        return values.iter().map(|v| v.as_str()).collect();
    }
    match opts.sample_strategy {
        SampleStrategy::First => values[..n].iter().map(|v| v.as_str()).collect(),
        SampleStrategy::Spread => (0..n)
            .map(|i| values[i * values.len() / n].as_str())
            .collect(),
    }
}

fn empty_fallback(flags: &[ReasonCode], note: &str) -> MappingResult {
    MappingResult {
        canon_type: CanonicalType::ShortText,
        confidence: confidence::LOSSY_FALLBACK,
        reason_codes: build_reason_codes(ReasonCode::LossyFallback, flags),
        warnings: vec![MappingWarning {
            code: ReasonCode::LossyFallback,
            message: note.to_string(),
            source_type: None,
            fallback_type: Some(CanonicalType::ShortText),
        }],
        notes: Some(note.to_string()),
    }
}

fn pattern_match(
    canon_type: CanonicalType,
    conf: f64,
    primary: ReasonCode,
    flags: &[ReasonCode],
    notes: Option<String>,
) -> MappingResult {
    MappingResult {
        canon_type,
        confidence: conf,
        reason_codes: build_reason_codes(primary, flags),
        warnings: Vec::new(),
        notes,
    }
}

/// Infer the canonical type of a column from raw string samples
pub fn infer_column_type(values: &[String], opts: &InferenceOptions) -> MappingResult {
    let sampled = sample(values, opts);
    if sampled.is_empty() {
        return empty_fallback(&[], "no samples provided, defaulting to short_text");
    }

    let non_empty: Vec<&str> = sampled
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect();

    let mut flags = Vec::new();
    let empty_ratio = 1.0 - non_empty.len() as f64 / sampled.len() as f64;
    if empty_ratio > EMPTY_SAMPLE_THRESHOLD {
        flags.push(ReasonCode::MostlyEmpty);
    }
    if non_empty.is_empty() {
        return empty_fallback(&flags, "all samples empty, defaulting to short_text");
    }

    if non_empty.iter().all(|v| patterns::is_iso_date(v)) {
        return pattern_match(
            CanonicalType::Date,
            confidence::EXACT,
            ReasonCode::ExactMatch,
            &flags,
            None,
        );
    }
    if non_empty.iter().all(|v| patterns::is_iso_datetime(v)) {
        return pattern_match(
            CanonicalType::Datetime,
            confidence::EXACT,
            ReasonCode::ExactMatch,
            &flags,
            None,
        );
    }
    if non_empty.iter().all(|v| patterns::is_boolean_token(v)) {
        return pattern_match(
            CanonicalType::Boolean,
            confidence::SEMANTIC_EQUIV,
            ReasonCode::SemanticEquiv,
            &flags,
            None,
        );
    }
    if non_empty.iter().all(|v| patterns::is_integer(v)) {
        return pattern_match(
            CanonicalType::Integer,
            confidence::EXACT,
            ReasonCode::ExactMatch,
            &flags,
            None,
        );
    }
    if non_empty.iter().all(|v| patterns::is_decimal(v)) {
        return pattern_match(
            CanonicalType::Decimal,
            confidence::EXACT,
            ReasonCode::ExactMatch,
            &flags,
            None,
        );
    }
    if non_empty.iter().all(|v| patterns::is_uuid(v)) {
        return pattern_match(
            CanonicalType::EntityRef,
            UUID_SHAPE_CONFIDENCE,
            ReasonCode::NarrowingWithMetadata,
            &flags,
            Some("uuid-shaped samples: reference target unknown".to_string()),
        );
    }

    // Length fallback, reclassified as enum when the value set is small
    let total_chars: usize = non_empty.iter().map(|v| v.chars().count()).sum();
    let avg_length = total_chars as f64 / non_empty.len() as f64;
    let mut canon_type = if avg_length < LONG_TEXT_AVG_LENGTH {
        CanonicalType::ShortText
    } else {
        CanonicalType::LongText
    };

    let distinct: BTreeSet<&str> = non_empty.iter().copied().collect();
    if distinct.len() <= LOW_DISTINCT_MAX && distinct.len() < non_empty.len() {
        canon_type = CanonicalType::Enum;
        flags.push(ReasonCode::LowDistinctValues);
    }

    pattern_match(
        canon_type,
        confidence::NARROWING_WITH_METADATA,
        ReasonCode::NarrowingWithMetadata,
        &flags,
        Some(format!("average sample length {:.1} characters", avg_length)),
    )
}

/// Distinct-value heuristic, composable on top of any classification
///
/// Few distinct values reclassify toward an enum (or boolean, when every
/// value is a boolean token) with the LOW_DISTINCT_VALUES flag; many
/// distinct values over enough samples reclassify toward free text with
/// HIGH_DISTINCT_VALUES. Anything in between returns the result unchanged.
pub fn refine_by_distinct_values(values: &[String], result: &MappingResult) -> MappingResult {
    let non_empty: Vec<&str> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect();
    if non_empty.is_empty() {
        return result.clone();
    }

    let distinct: BTreeSet<&str> = non_empty.iter().copied().collect();
    let ratio = distinct.len() as f64 / non_empty.len() as f64;

    let (canon_type, flag) = if distinct.len() <= 2
        && non_empty.iter().all(|v| patterns::is_boolean_token(v))
    {
        (CanonicalType::Boolean, ReasonCode::LowDistinctValues)
    } else if distinct.len() <= LOW_DISTINCT_MAX && distinct.len() < non_empty.len() {
        (CanonicalType::Enum, ReasonCode::LowDistinctValues)
    } else if non_empty.len() >= HIGH_DISTINCT_MIN_SAMPLES && ratio >= HIGH_DISTINCT_RATIO {
        let texty = matches!(
            result.canon_type,
            CanonicalType::ShortText | CanonicalType::LongText | CanonicalType::RichText
        );
        let target = if texty {
            result.canon_type
        } else {
            CanonicalType::ShortText
        };
        (target, ReasonCode::HighDistinctValues)
    } else {
        return result.clone();
    };

    let primary = result
        .reason_codes
        .first()
        .copied()
        .unwrap_or(ReasonCode::NarrowingWithMetadata);
    let mut flags: Vec<ReasonCode> = result.reason_codes[1..].to_vec();
    flags.push(flag);

    MappingResult {
        canon_type,
        confidence: result.confidence,
        reason_codes: build_reason_codes(primary, &flags),
        warnings: result.warnings.clone(),
        notes: result.notes.clone(),
    }
}
