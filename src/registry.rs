//! Custom mapping registry
//!
//! A scoped, mutable store of caller-supplied type-mapping overrides. The
//! core mapper never reaches into a registry implicitly; integrators
//! consult one before or around the mapper. Re-registering an existing key
//! must clear three checks, in order: the existing entry allows override,
//! the incoming priority is not lower, and on equal priority the incoming
//! source strictly outranks the existing one (`system` > `org` >
//! `migration`). A rejection is a hard error naming the violated rule, so
//! ordering mistakes surface immediately instead of silently losing a
//! registration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{CanonicalType, ReasonCode};

/// Where a custom mapping came from; fixed tie-break ranks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingSource {
    Migration,
    Org,
    System,
}

impl MappingSource {
    /// Tie-break rank: `system` (3) > `org` (2) > `migration` (1)
    pub fn rank(&self) -> u8 {
        match self {
            MappingSource::Migration => 1,
            MappingSource::Org => 2,
            MappingSource::System => 3,
        }
    }
}

impl std::fmt::Display for MappingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MappingSource::Migration => write!(f, "migration"),
            MappingSource::Org => write!(f, "org"),
            MappingSource::System => write!(f, "system"),
        }
    }
}

/// A caller-supplied override for one source type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomTypeMapping {
    /// The source type this mapping overrides
    pub source_type: String,
    /// The canonical type to map it to
    pub canon_type: CanonicalType,
    /// Confidence the caller assigns to the override
    pub confidence: f64,
    /// Explanation codes the caller attaches
    pub reason_codes: Vec<ReasonCode>,
    /// Origin, used for the tie-break rank
    pub source: MappingSource,
    /// Higher priority wins on re-registration
    pub priority: i32,
    /// When false, the entry can never be replaced
    pub allow_override: bool,
}

/// Registration conflicts; the message names the violated rule
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Cannot replace mapping for '{source_type}': existing entry has allowOverride=false")]
    OverrideLocked { source_type: String },

    #[error(
        "Cannot replace mapping for '{source_type}': existing entry has higher-priority {existing} (incoming {incoming})"
    )]
    LowerPriority {
        source_type: String,
        existing: i32,
        incoming: i32,
    },

    #[error(
        "Cannot replace mapping for '{source_type}': tie-break failed, incoming source '{incoming}' does not outrank existing '{existing}'"
    )]
    TieBreak {
        source_type: String,
        existing: MappingSource,
        incoming: MappingSource,
    },
}

/// Scoped store of custom type mappings
///
/// Owned exclusively by whatever constructs it; not persisted by the
/// engine. Registrations are expected at startup/configuration time.
#[derive(Debug, Default)]
pub struct CustomMappingRegistry {
    entries: HashMap<String, CustomTypeMapping>,
}

impl CustomMappingRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn key(source_type: &str) -> String {
        source_type.trim().to_lowercase()
    }

    /// Register a mapping, replacing an existing entry only when all three
    /// conflict checks pass
    pub fn register(&mut self, mapping: CustomTypeMapping) -> Result<(), RegistryError> {
        let key = Self::key(&mapping.source_type);

        if let Some(existing) = self.entries.get(&key) {
            if !existing.allow_override {
                return Err(RegistryError::OverrideLocked {
                    source_type: mapping.source_type,
                });
            }
            if mapping.priority < existing.priority {
                return Err(RegistryError::LowerPriority {
                    source_type: mapping.source_type,
                    existing: existing.priority,
                    incoming: mapping.priority,
                });
            }
            if mapping.priority == existing.priority
                && mapping.source.rank() <= existing.source.rank()
            {
                return Err(RegistryError::TieBreak {
                    source_type: mapping.source_type,
                    existing: existing.source,
                    incoming: mapping.source,
                });
            }
        }

        tracing::debug!(
            source_type = %mapping.source_type,
            canon_type = %mapping.canon_type,
            source = %mapping.source,
            "registered custom mapping"
        );
        self.entries.insert(key, mapping);
        Ok(())
    }

    /// Look up the mapping for a source type
    pub fn resolve(&self, source_type: &str) -> Option<&CustomTypeMapping> {
        self.entries.get(&Self::key(source_type))
    }

    /// Whether a mapping exists for a source type
    pub fn has(&self, source_type: &str) -> bool {
        self.entries.contains_key(&Self::key(source_type))
    }

    /// All mappings in deterministic key order
    pub fn list(&self) -> Vec<&CustomTypeMapping> {
        let mut keys: Vec<&String> = self.entries.keys().collect();
        keys.sort();
        keys.into_iter().map(|k| &self.entries[k]).collect()
    }

    /// Remove every mapping
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of registered mappings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no mappings are registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
