//! Unknown-type fallback policy
//!
//! A thin adapter for callers who caught a strict-mode classification
//! failure and want a deterministic fallback instead of a second bespoke
//! error path.

use serde::{Deserialize, Serialize};

use crate::mapper::MapperError;
use crate::reason::build_reason_codes;
use crate::types::{
    CanonicalType, MappingResult, MappingWarning, ReasonCode, confidence,
};

/// What to do with a classification failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyAction {
    /// Re-raise the error unchanged
    Throw,
    /// Log a warning and fall back
    WarnAndFallback,
    /// Fall back silently
    FallbackOnly,
}

/// Fallback policy configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnknownTypePolicy {
    pub action: PolicyAction,
    /// Canonical type to fall back to
    pub fallback_type: CanonicalType,
}

impl Default for UnknownTypePolicy {
    fn default() -> Self {
        Self {
            action: PolicyAction::WarnAndFallback,
            fallback_type: CanonicalType::ShortText,
        }
    }
}

/// Convert a classification failure into a deterministic fallback result
///
/// `Throw` re-raises the error unchanged. The fallback actions build
/// exactly one warning, confidence `LOSSY_FALLBACK`, and reason codes
/// `[LOSSY_FALLBACK, UNKNOWN_PG_TYPE]` in that fixed order.
pub fn apply_unknown_type_policy(
    error: MapperError,
    source_type: &str,
    policy: &UnknownTypePolicy,
) -> Result<MappingResult, MapperError> {
    if policy.action == PolicyAction::Throw {
        return Err(error);
    }

    if policy.action == PolicyAction::WarnAndFallback {
        tracing::warn!(
            source_type,
            fallback_type = %policy.fallback_type,
            error = %error,
            "classification failed, applying fallback policy"
        );
    }

    Ok(MappingResult {
        canon_type: policy.fallback_type,
        confidence: confidence::LOSSY_FALLBACK,
        reason_codes: build_reason_codes(ReasonCode::LossyFallback, &[ReasonCode::UnknownPgType]),
        warnings: vec![MappingWarning {
            code: ReasonCode::UnknownPgType,
            message: error.to_string(),
            source_type: Some(source_type.to_string()),
            fallback_type: Some(policy.fallback_type),
        }],
        notes: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unknown_error() -> MapperError {
        MapperError::UnknownType {
            source_type: "mystery_type".to_string(),
        }
    }

    #[test]
    fn test_throw_reraises_unchanged() {
        let policy = UnknownTypePolicy {
            action: PolicyAction::Throw,
            fallback_type: CanonicalType::ShortText,
        };
        let err = apply_unknown_type_policy(unknown_error(), "mystery_type", &policy).unwrap_err();
        assert_eq!(err, unknown_error());
    }

    #[test]
    fn test_fallback_shape() {
        let policy = UnknownTypePolicy {
            action: PolicyAction::FallbackOnly,
            fallback_type: CanonicalType::Json,
        };
        let r = apply_unknown_type_policy(unknown_error(), "mystery_type", &policy).unwrap();

        assert_eq!(r.canon_type, CanonicalType::Json);
        assert_eq!(r.confidence, confidence::LOSSY_FALLBACK);
        assert_eq!(
            r.reason_codes,
            vec![ReasonCode::LossyFallback, ReasonCode::UnknownPgType]
        );
        assert_eq!(r.warnings.len(), 1);
        assert_eq!(r.warnings[0].source_type.as_deref(), Some("mystery_type"));
        assert_eq!(r.warnings[0].fallback_type, Some(CanonicalType::Json));
    }

    #[test]
    fn test_warn_and_fallback_same_result() {
        let warn = UnknownTypePolicy {
            action: PolicyAction::WarnAndFallback,
            fallback_type: CanonicalType::ShortText,
        };
        let silent = UnknownTypePolicy {
            action: PolicyAction::FallbackOnly,
            fallback_type: CanonicalType::ShortText,
        };
        let a = apply_unknown_type_policy(unknown_error(), "mystery_type", &warn).unwrap();
        let b = apply_unknown_type_policy(unknown_error(), "mystery_type", &silent).unwrap();
        assert_eq!(a, b);
    }
}
