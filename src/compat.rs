//! Compatibility matrix over the canonical type vocabulary
//!
//! Classifies how safe a conversion from one canonical type into another
//! is. The matrix is total: every ordered pair resolves to exactly one
//! [`CompatLevel`], the diagonal is always `Exact`, and unknown tag text at
//! the string boundary resolves to `Incompatible` rather than erroring.
//!
//! Family rules:
//! - text widens toward longer text and toward `json`
//! - numeric widens from `integer` to `decimal` to `json`
//! - temporal widens from `date` to `datetime` to text
//! - single-choice widens to multi-choice; format-specific text
//!   (email/phone/url) narrows toward generic text
//! - `json` is a universal widening target for scalar types and a
//!   narrowing source back to any specific scalar
//! - `formula` (derived/read-only) is incompatible with everything but
//!   itself

use serde::{Deserialize, Serialize};

use crate::types::CanonicalType;

/// Safety classification of converting one canonical type into another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatLevel {
    /// Same type, no conversion
    Exact,
    /// Target can represent every source value
    Widening,
    /// Conversion is defined but drops a constraint or metadata
    Narrowing,
    /// Conversion may fail or lose data for some values
    Lossy,
    /// No meaningful conversion exists
    Incompatible,
}

impl std::fmt::Display for CompatLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            CompatLevel::Exact => "exact",
            CompatLevel::Widening => "widening",
            CompatLevel::Narrowing => "narrowing",
            CompatLevel::Lossy => "lossy",
            CompatLevel::Incompatible => "incompatible",
        };
        write!(f, "{}", tag)
    }
}

/// Look up the conversion classification for an ordered type pair
pub fn get_compat_level(from: CanonicalType, to: CanonicalType) -> CompatLevel {
    use CanonicalType::*;
    use CompatLevel::*;

    if from == to {
        return Exact;
    }
    // Formula columns are derived and read-only on both sides.
    if from == Formula || to == Formula {
        return Incompatible;
    }

    match (from, to) {
        // Text widens toward longer text
        (ShortText, LongText | RichText) | (LongText, RichText) => Widening,
        (RichText, ShortText | LongText) | (LongText, ShortText) => Narrowing,

        // Format-specific text narrows toward generic text; the reverse
        // cannot guarantee the format
        (Email | Phone | Url, ShortText | LongText) => Narrowing,
        (ShortText | LongText, Email | Phone | Url) => Lossy,

        // Numeric widens integer -> decimal; money carries a currency
        (Integer, Decimal) => Widening,
        (Decimal, Integer) => Narrowing,
        (Money, Currency) | (Currency, Money) => Widening,
        (Money | Currency, Decimal) => Narrowing,
        (Integer | Decimal, Money | Currency) | (Money | Currency, Integer) => Lossy,

        // Temporal widens date -> datetime -> text
        (Date, Datetime) => Widening,
        (Datetime, Date) => Narrowing,
        (Date | Datetime, ShortText | LongText) => Widening,

        // Numbers and booleans render to text, but parsing back can fail
        (Integer | Decimal | Money | Currency | Boolean, ShortText | LongText) => Lossy,
        (
            ShortText | LongText,
            Integer | Decimal | Money | Currency | Boolean | Date | Datetime,
        ) => Lossy,
        (Boolean, Integer | Decimal) => Lossy,

        // Single-choice widens to multi-choice; the enum/select pairs are
        // sibling vocabularies for the same shape
        (Enum, SingleSelect) | (SingleSelect, Enum) => Widening,
        (MultiEnum, MultiSelect) | (MultiSelect, MultiEnum) => Widening,
        (Enum | SingleSelect, MultiEnum | MultiSelect) => Widening,
        (MultiEnum | MultiSelect, Enum | SingleSelect) => Narrowing,

        // Choice values are strings underneath
        (Enum | SingleSelect, ShortText | LongText) => Narrowing,
        (MultiEnum | MultiSelect, ShortText | LongText) => Lossy,
        (ShortText | LongText, Enum | SingleSelect | MultiEnum | MultiSelect) => Lossy,

        // References
        (EntityRef, Relation) => Widening,
        (Relation, EntityRef) => Narrowing,
        (EntityRef, ShortText | LongText) => Narrowing,
        (ShortText | LongText, EntityRef) => Lossy,

        // Binary payloads
        (Binary, File) => Widening,
        (File, Binary) => Narrowing,
        (Binary | File, Json) => Lossy,
        (Json, Binary | File) => Incompatible,

        // json is a universal widening target and a narrowing source
        (_, Json) => Widening,
        (Json, _) => Narrowing,

        _ => Incompatible,
    }
}

/// True iff a value of `from` can be stored as `to` without a transform
pub fn is_compatible(from: CanonicalType, to: CanonicalType) -> bool {
    matches!(
        get_compat_level(from, to),
        CompatLevel::Exact | CompatLevel::Widening
    )
}

/// True iff the conversion is defined but needs an explicit transform step
pub fn requires_transform(from: CanonicalType, to: CanonicalType) -> bool {
    matches!(
        get_compat_level(from, to),
        CompatLevel::Narrowing | CompatLevel::Lossy
    )
}

/// String-tag boundary lookup
///
/// Unknown tag text is a runtime safety concern, not a normal path; it
/// resolves to `Incompatible` instead of erroring.
pub fn compat_level_of(from: &str, to: &str) -> CompatLevel {
    match (
        from.parse::<CanonicalType>(),
        to.parse::<CanonicalType>(),
    ) {
        (Ok(f), Ok(t)) => get_compat_level(f, t),
        _ => CompatLevel::Incompatible,
    }
}
