//! Core vocabulary for the type-mapping engine
//!
//! Defines the closed canonical type enumeration every source type maps
//! into, the fixed confidence levels, the reason-code token set, and the
//! universal `MappingResult` shape returned by the mappers and the
//! fallback policy.

use serde::{Deserialize, Serialize};

/// Canonical type vocabulary
///
/// A closed, versioned enumeration. Source types (PostgreSQL column types,
/// CSV sample values) are always classified into exactly one of these tags.
/// Downstream consumers (storage columns, validators, UI fields) reference
/// these by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalType {
    ShortText,
    LongText,
    Integer,
    Decimal,
    Money,
    Boolean,
    Date,
    Datetime,
    Enum,
    MultiEnum,
    Email,
    Phone,
    Url,
    EntityRef,
    Json,
    Binary,
    File,
    SingleSelect,
    MultiSelect,
    RichText,
    Currency,
    Formula,
    Relation,
}

impl CanonicalType {
    /// All canonical types, for exhaustive iteration
    pub const ALL: [CanonicalType; 23] = [
        CanonicalType::ShortText,
        CanonicalType::LongText,
        CanonicalType::Integer,
        CanonicalType::Decimal,
        CanonicalType::Money,
        CanonicalType::Boolean,
        CanonicalType::Date,
        CanonicalType::Datetime,
        CanonicalType::Enum,
        CanonicalType::MultiEnum,
        CanonicalType::Email,
        CanonicalType::Phone,
        CanonicalType::Url,
        CanonicalType::EntityRef,
        CanonicalType::Json,
        CanonicalType::Binary,
        CanonicalType::File,
        CanonicalType::SingleSelect,
        CanonicalType::MultiSelect,
        CanonicalType::RichText,
        CanonicalType::Currency,
        CanonicalType::Formula,
        CanonicalType::Relation,
    ];

    /// The snake_case tag used in serialized output and at the string boundary
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalType::ShortText => "short_text",
            CanonicalType::LongText => "long_text",
            CanonicalType::Integer => "integer",
            CanonicalType::Decimal => "decimal",
            CanonicalType::Money => "money",
            CanonicalType::Boolean => "boolean",
            CanonicalType::Date => "date",
            CanonicalType::Datetime => "datetime",
            CanonicalType::Enum => "enum",
            CanonicalType::MultiEnum => "multi_enum",
            CanonicalType::Email => "email",
            CanonicalType::Phone => "phone",
            CanonicalType::Url => "url",
            CanonicalType::EntityRef => "entity_ref",
            CanonicalType::Json => "json",
            CanonicalType::Binary => "binary",
            CanonicalType::File => "file",
            CanonicalType::SingleSelect => "single_select",
            CanonicalType::MultiSelect => "multi_select",
            CanonicalType::RichText => "rich_text",
            CanonicalType::Currency => "currency",
            CanonicalType::Formula => "formula",
            CanonicalType::Relation => "relation",
        }
    }
}

impl std::fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CanonicalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CanonicalType::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown canonical type tag: {}", s))
    }
}

/// Fixed confidence levels attached to mapping results
///
/// Strictly descending: `EXACT > SEMANTIC_EQUIV > NARROWING_WITH_METADATA >
/// LOSSY_FALLBACK`. Results never carry an independently invented value
/// outside these levels except by explicit confidence math documented at
/// the call site.
pub mod confidence {
    /// Source type is representationally identical to the canonical type
    pub const EXACT: f64 = 1.0;
    /// Same meaning, representation differs in a recoverable way
    pub const SEMANTIC_EQUIV: f64 = 0.95;
    /// Correct only together with the supplied length/precision metadata
    pub const NARROWING_WITH_METADATA: f64 = 0.8;
    /// Last-resort classification, data loss possible
    pub const LOSSY_FALLBACK: f64 = 0.4;
}

/// Machine-readable explanation token attached to a mapping result
///
/// Exactly one *primary* code (the first four variants) leads every
/// `reason_codes` array; the remaining variants are *flags* appended in
/// stable lexicographic order by [`crate::reason::build_reason_codes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    // Primary classifications
    ExactMatch,
    SemanticEquiv,
    NarrowingWithMetadata,
    LossyFallback,
    // Flags
    UnknownPgType,
    DomainTypeDetected,
    CompositeTypeDetected,
    LowDistinctValues,
    HighDistinctValues,
    MostlyEmpty,
}

impl ReasonCode {
    /// The SCREAMING_SNAKE_CASE token used in serialized output
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::ExactMatch => "EXACT_MATCH",
            ReasonCode::SemanticEquiv => "SEMANTIC_EQUIV",
            ReasonCode::NarrowingWithMetadata => "NARROWING_WITH_METADATA",
            ReasonCode::LossyFallback => "LOSSY_FALLBACK",
            ReasonCode::UnknownPgType => "UNKNOWN_PG_TYPE",
            ReasonCode::DomainTypeDetected => "DOMAIN_TYPE_DETECTED",
            ReasonCode::CompositeTypeDetected => "COMPOSITE_TYPE_DETECTED",
            ReasonCode::LowDistinctValues => "LOW_DISTINCT_VALUES",
            ReasonCode::HighDistinctValues => "HIGH_DISTINCT_VALUES",
            ReasonCode::MostlyEmpty => "MOSTLY_EMPTY",
        }
    }

    /// Whether this code is a primary classification (vs a flag)
    pub fn is_primary(&self) -> bool {
        matches!(
            self,
            ReasonCode::ExactMatch
                | ReasonCode::SemanticEquiv
                | ReasonCode::NarrowingWithMetadata
                | ReasonCode::LossyFallback
        )
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Warning carried alongside a lossy or degraded mapping result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingWarning {
    /// The reason code that produced this warning
    pub code: ReasonCode,
    /// Human-readable explanation
    pub message: String,
    /// The original source type, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    /// The canonical type the engine fell back to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_type: Option<CanonicalType>,
}

/// Universal return shape of both mappers and the fallback policy
///
/// `warnings` is always present (possibly empty) and `reason_codes` is
/// never empty. Any result whose codes contain `LOSSY_FALLBACK` carries at
/// least one warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingResult {
    /// The canonical classification
    pub canon_type: CanonicalType,
    /// Confidence score, one of the fixed levels in [`confidence`]
    pub confidence: f64,
    /// Primary classification first, then deduplicated sorted flags
    pub reason_codes: Vec<ReasonCode>,
    /// Warnings for lossy or degraded results
    pub warnings: Vec<MappingWarning>,
    /// Free-form note for humans (e.g. measured sample statistics)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Optional length/precision metadata supplied with a source type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    /// Declared maximum length for bounded text types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    /// Numeric precision
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    /// Numeric scale
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
}

impl TypeMeta {
    /// Metadata with only a maximum length set
    pub fn with_max_length(max_length: u32) -> Self {
        Self {
            max_length: Some(max_length),
            ..Self::default()
        }
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.max_length.is_none() && self.precision.is_none() && self.scale.is_none()
    }
}
