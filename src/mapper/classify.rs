//! Pure PostgreSQL type classifier
//!
//! No side effects: the caching/telemetry wrapper lives in the parent
//! module. Classification is a total static lookup over the known-type
//! table plus an explicit unknown branch whose behavior is selected by
//! [`MapMode`](super::MapMode).

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::MapMode;
use super::error::MapperError;
use crate::reason::build_reason_codes;
use crate::types::{CanonicalType, MappingResult, MappingWarning, ReasonCode, TypeMeta, confidence};

/// Bounded text longer than this narrows to the long-text classification
const LONG_TEXT_LENGTH_THRESHOLD: u32 = 255;

/// How faithfully a known-table entry represents its canonical type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MatchClass {
    /// Representationally identical
    Exact,
    /// Same meaning, representation differs (timezones, binary floats, ...)
    Semantic,
    /// Identifier types: reference semantics depend on external schema context
    Identifier,
}

/// A source type name normalized for lookup and cache keying
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NormalizedType {
    pub name: String,
    pub is_array: bool,
}

/// Short and numeric aliases collapse to their canonical spelling so that
/// alias spelling never changes a classification or a cache key
static TYPE_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("bool", "boolean"),
        ("int", "integer"),
        ("int2", "smallint"),
        ("int4", "integer"),
        ("int8", "bigint"),
        ("float", "double precision"),
        ("float4", "real"),
        ("float8", "double precision"),
        ("decimal", "numeric"),
        ("char", "character"),
        ("bpchar", "character"),
        ("varchar", "character varying"),
        ("timestamp", "timestamp without time zone"),
        ("timestamptz", "timestamp with time zone"),
        ("time", "time without time zone"),
        ("timetz", "time with time zone"),
        ("serial2", "smallserial"),
        ("serial4", "serial"),
        ("serial8", "bigserial"),
        ("varbit", "bit varying"),
    ])
});

/// Static total lookup table from normalized type name to canonical type
static KNOWN_TYPES: Lazy<HashMap<&'static str, (CanonicalType, MatchClass)>> = Lazy::new(|| {
    use CanonicalType::*;
    use MatchClass::*;
    HashMap::from([
        // Text
        ("character varying", (ShortText, Exact)),
        ("character", (ShortText, Exact)),
        ("text", (LongText, Exact)),
        ("citext", (ShortText, Semantic)),
        ("name", (ShortText, Semantic)),
        // Numeric
        ("smallint", (Integer, Exact)),
        ("integer", (Integer, Exact)),
        ("bigint", (Integer, Exact)),
        ("smallserial", (Integer, Semantic)),
        ("serial", (Integer, Semantic)),
        ("bigserial", (Integer, Semantic)),
        ("numeric", (Decimal, Exact)),
        ("real", (Decimal, Semantic)),
        ("double precision", (Decimal, Semantic)),
        ("money", (Money, Exact)),
        ("oid", (Integer, Semantic)),
        // Boolean
        ("boolean", (Boolean, Exact)),
        // Temporal
        ("date", (Date, Exact)),
        ("timestamp without time zone", (Datetime, Exact)),
        ("timestamp with time zone", (Datetime, Semantic)),
        ("time without time zone", (Datetime, Semantic)),
        ("time with time zone", (Datetime, Semantic)),
        ("interval", (ShortText, Semantic)),
        // JSON
        ("json", (Json, Exact)),
        ("jsonb", (Json, Exact)),
        // Binary
        ("bytea", (Binary, Exact)),
        // Identifier
        ("uuid", (EntityRef, Identifier)),
        // Geometric
        ("point", (Json, Semantic)),
        ("line", (Json, Semantic)),
        ("lseg", (Json, Semantic)),
        ("box", (Json, Semantic)),
        ("path", (Json, Semantic)),
        ("polygon", (Json, Semantic)),
        ("circle", (Json, Semantic)),
        // Network
        ("inet", (ShortText, Semantic)),
        ("cidr", (ShortText, Semantic)),
        ("macaddr", (ShortText, Semantic)),
        ("macaddr8", (ShortText, Semantic)),
        // Range
        ("int4range", (Json, Semantic)),
        ("int8range", (Json, Semantic)),
        ("numrange", (Json, Semantic)),
        ("tsrange", (Json, Semantic)),
        ("tstzrange", (Json, Semantic)),
        ("daterange", (Json, Semantic)),
        // Search
        ("tsvector", (LongText, Semantic)),
        ("tsquery", (LongText, Semantic)),
        // Miscellaneous
        ("xml", (LongText, Semantic)),
        ("bit", (ShortText, Semantic)),
        ("bit varying", (ShortText, Semantic)),
    ])
});

/// Normalize a raw source type name: lowercase, trim, strip array markers
/// (`[]` suffix or leading underscore), collapse known aliases
pub(crate) fn normalize_source_type(raw: &str) -> NormalizedType {
    let mut name = raw.trim().to_lowercase();
    let mut is_array = false;

    while name.ends_with("[]") {
        name.truncate(name.len() - 2);
        is_array = true;
    }
    if let Some(stripped) = name.strip_prefix('_') {
        // pg catalogs spell array types with a leading underscore
        name = stripped.to_string();
        is_array = true;
    }

    if let Some(canonical) = TYPE_ALIASES.get(name.as_str()) {
        name = (*canonical).to_string();
    }

    NormalizedType { name, is_array }
}

fn lossy_fallback(
    source_type: &str,
    flag: ReasonCode,
    fallback: CanonicalType,
    message: String,
) -> MappingResult {
    MappingResult {
        canon_type: fallback,
        confidence: confidence::LOSSY_FALLBACK,
        reason_codes: build_reason_codes(ReasonCode::LossyFallback, &[flag]),
        warnings: vec![MappingWarning {
            code: flag,
            message,
            source_type: Some(source_type.to_string()),
            fallback_type: Some(fallback),
        }],
        notes: None,
    }
}

/// Classify a source type into the canonical vocabulary
///
/// Pure: identical inputs always produce identical results, including
/// reason-code ordering.
pub fn classify_source_type(
    source_type: &str,
    meta: Option<&TypeMeta>,
    mode: MapMode,
) -> Result<MappingResult, MapperError> {
    let meta = meta.copied().unwrap_or_default();
    let norm = normalize_source_type(source_type);

    if norm.is_array {
        // Element types are not preserved in the closed vocabulary; arrays
        // land in json with the element named in the note.
        return Ok(MappingResult {
            canon_type: CanonicalType::Json,
            confidence: confidence::SEMANTIC_EQUIV,
            reason_codes: build_reason_codes(ReasonCode::SemanticEquiv, &[]),
            warnings: Vec::new(),
            notes: Some(format!("array of '{}' mapped to json", norm.name)),
        });
    }

    if let Some((canon, class)) = KNOWN_TYPES.get(norm.name.as_str()).copied() {
        // Bounded text beyond the short-text threshold narrows to long text
        if canon == CanonicalType::ShortText
            && class != MatchClass::Identifier
            && meta.max_length.is_some_and(|len| len > LONG_TEXT_LENGTH_THRESHOLD)
        {
            return Ok(MappingResult {
                canon_type: CanonicalType::LongText,
                confidence: confidence::NARROWING_WITH_METADATA,
                reason_codes: build_reason_codes(ReasonCode::NarrowingWithMetadata, &[]),
                warnings: Vec::new(),
                notes: Some(format!(
                    "max length {} exceeds {}, classified as long text",
                    meta.max_length.unwrap_or_default(),
                    LONG_TEXT_LENGTH_THRESHOLD
                )),
            });
        }

        let result = match class {
            MatchClass::Exact => MappingResult {
                canon_type: canon,
                confidence: confidence::EXACT,
                reason_codes: build_reason_codes(ReasonCode::ExactMatch, &[]),
                warnings: Vec::new(),
                notes: None,
            },
            MatchClass::Semantic => MappingResult {
                canon_type: canon,
                confidence: confidence::SEMANTIC_EQUIV,
                reason_codes: build_reason_codes(ReasonCode::SemanticEquiv, &[]),
                warnings: Vec::new(),
                notes: None,
            },
            MatchClass::Identifier => MappingResult {
                canon_type: canon,
                confidence: confidence::NARROWING_WITH_METADATA,
                reason_codes: build_reason_codes(ReasonCode::NarrowingWithMetadata, &[]),
                warnings: Vec::new(),
                notes: Some(
                    "identifier type: reference semantics depend on external schema context"
                        .to_string(),
                ),
            },
        };
        return Ok(result);
    }

    // Composite detection is a known-coarse heuristic: any namespace
    // separator marks the name composite, which will also catch
    // legitimately-namespaced simple types.
    if norm.name.contains('.') {
        if mode == MapMode::Strict {
            return Err(MapperError::CompositeType {
                source_type: source_type.to_string(),
            });
        }
        tracing::warn!(source_type, "composite type, falling back to json");
        return Ok(lossy_fallback(
            source_type,
            ReasonCode::CompositeTypeDetected,
            CanonicalType::Json,
            format!("composite type '{}' mapped to json", source_type),
        ));
    }

    // An unknown name carrying length/precision metadata reads as a domain
    // over a base type; a bare unknown name is wholly unknown.
    if !meta.is_empty() {
        if mode == MapMode::Strict {
            return Err(MapperError::DomainType {
                source_type: source_type.to_string(),
            });
        }
        tracing::warn!(source_type, "domain type, falling back to short_text");
        return Ok(lossy_fallback(
            source_type,
            ReasonCode::DomainTypeDetected,
            CanonicalType::ShortText,
            format!(
                "domain type '{}' cannot be resolved without catalog access, mapped to short_text",
                source_type
            ),
        ));
    }

    if mode == MapMode::Strict {
        return Err(MapperError::UnknownType {
            source_type: source_type.to_string(),
        });
    }
    tracing::warn!(source_type, "unknown type, falling back to short_text");
    Ok(lossy_fallback(
        source_type,
        ReasonCode::UnknownPgType,
        CanonicalType::ShortText,
        format!("unknown type '{}' mapped to short_text", source_type),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        let n = normalize_source_type("  VARCHAR ");
        assert_eq!(n.name, "character varying");
        assert!(!n.is_array);
    }

    #[test]
    fn test_normalize_array_markers() {
        let n = normalize_source_type("integer[]");
        assert_eq!(n.name, "integer");
        assert!(n.is_array);

        let n = normalize_source_type("_int4");
        assert_eq!(n.name, "integer");
        assert!(n.is_array);
    }

    #[test]
    fn test_alias_collapse() {
        assert_eq!(normalize_source_type("int4").name, "integer");
        assert_eq!(normalize_source_type("bool").name, "boolean");
        assert_eq!(
            normalize_source_type("timestamptz").name,
            "timestamp with time zone"
        );
    }

    #[test]
    fn test_known_exact() {
        let r = classify_source_type("text", None, MapMode::Strict).unwrap();
        assert_eq!(r.canon_type, CanonicalType::LongText);
        assert_eq!(r.confidence, confidence::EXACT);
        assert_eq!(r.reason_codes, vec![ReasonCode::ExactMatch]);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn test_timezone_semantics() {
        let r = classify_source_type("timestamptz", None, MapMode::Strict).unwrap();
        assert_eq!(r.canon_type, CanonicalType::Datetime);
        assert_eq!(r.confidence, confidence::SEMANTIC_EQUIV);
        assert_eq!(r.reason_codes[0], ReasonCode::SemanticEquiv);
    }

    #[test]
    fn test_bounded_text_narrows() {
        let meta = TypeMeta::with_max_length(1024);
        let r = classify_source_type("varchar", Some(&meta), MapMode::Strict).unwrap();
        assert_eq!(r.canon_type, CanonicalType::LongText);
        assert_eq!(r.confidence, confidence::NARROWING_WITH_METADATA);

        let meta = TypeMeta::with_max_length(255);
        let r = classify_source_type("varchar", Some(&meta), MapMode::Strict).unwrap();
        assert_eq!(r.canon_type, CanonicalType::ShortText);
        assert_eq!(r.confidence, confidence::EXACT);
    }

    #[test]
    fn test_uuid_is_identifier() {
        let r = classify_source_type("uuid", None, MapMode::Strict).unwrap();
        assert_eq!(r.canon_type, CanonicalType::EntityRef);
        assert_eq!(r.confidence, confidence::NARROWING_WITH_METADATA);
    }

    #[test]
    fn test_array_maps_to_json() {
        let r = classify_source_type("text[]", None, MapMode::Strict).unwrap();
        assert_eq!(r.canon_type, CanonicalType::Json);
        assert_eq!(r.confidence, confidence::SEMANTIC_EQUIV);
        assert!(r.notes.unwrap().contains("text"));
    }

    #[test]
    fn test_unknown_strict_throws() {
        let err = classify_source_type("totally_unknown_type", None, MapMode::Strict).unwrap_err();
        assert!(matches!(err, MapperError::UnknownType { .. }));
    }

    #[test]
    fn test_unknown_loose_falls_back() {
        let r = classify_source_type("totally_unknown_type", None, MapMode::Loose).unwrap();
        assert_eq!(r.canon_type, CanonicalType::ShortText);
        assert_eq!(r.confidence, confidence::LOSSY_FALLBACK);
        assert_eq!(
            r.reason_codes,
            vec![ReasonCode::LossyFallback, ReasonCode::UnknownPgType]
        );
        assert_eq!(r.warnings.len(), 1);
        assert_eq!(r.warnings[0].fallback_type, Some(CanonicalType::ShortText));
    }

    #[test]
    fn test_domain_heuristic_needs_metadata() {
        let meta = TypeMeta::with_max_length(12);

        let err =
            classify_source_type("us_postal_code", Some(&meta), MapMode::Strict).unwrap_err();
        assert!(matches!(err, MapperError::DomainType { .. }));

        let r = classify_source_type("us_postal_code", Some(&meta), MapMode::Loose).unwrap();
        assert_eq!(r.canon_type, CanonicalType::ShortText);
        assert!(r.reason_codes.contains(&ReasonCode::DomainTypeDetected));
        assert_eq!(r.warnings.len(), 1);
    }

    #[test]
    fn test_composite_detection() {
        let err = classify_source_type("inventory.item", None, MapMode::Strict).unwrap_err();
        assert!(matches!(err, MapperError::CompositeType { .. }));

        let r = classify_source_type("inventory.item", None, MapMode::Loose).unwrap();
        assert_eq!(r.canon_type, CanonicalType::Json);
        assert!(r.reason_codes.contains(&ReasonCode::CompositeTypeDetected));
    }

    #[test]
    fn test_determinism() {
        let meta = TypeMeta::with_max_length(500);
        let a = classify_source_type("varchar", Some(&meta), MapMode::Loose).unwrap();
        let b = classify_source_type("varchar", Some(&meta), MapMode::Loose).unwrap();
        assert_eq!(a, b);
    }
}
