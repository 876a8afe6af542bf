//! Error types for PostgreSQL type mapping

use thiserror::Error;

/// Classification failures raised by the mapper in strict mode
///
/// Each variant names the offending source type and why resolution was
/// impossible, so callers can either propagate the error or route it
/// through [`crate::policy::apply_unknown_type_policy`] for a deterministic
/// fallback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapperError {
    /// The type name is not in the known-type table
    #[error("Unknown PostgreSQL type '{source_type}': not present in the known-type table")]
    UnknownType { source_type: String },

    /// The type looks like a domain over a base type; resolving it needs
    /// catalog access the engine does not have
    #[error("Domain type '{source_type}' cannot be resolved without catalog access")]
    DomainType { source_type: String },

    /// The type is composite (record-like); it has no scalar canonical mapping
    #[error("Composite type '{source_type}' has no scalar canonical mapping")]
    CompositeType { source_type: String },
}

impl MapperError {
    /// The source type that failed to classify
    pub fn source_type(&self) -> &str {
        match self {
            MapperError::UnknownType { source_type }
            | MapperError::DomainType { source_type }
            | MapperError::CompositeType { source_type } => source_type,
        }
    }
}
