//! PostgreSQL type mapper
//!
//! Two layers: a pure core classifier ([`classify_source_type`]) and
//! the public wrapper here, which adds caching and telemetry. The wrapper
//! never alters the classified value: a cache hit returns the stored
//! result, a miss computes, stores, and reports timing.
//!
//! ## Example
//!
//! ```rust,ignore
//! use type_mapping_core::mapper::{MapperOptions, map_source_type};
//! use type_mapping_core::types::TypeMeta;
//!
//! let meta = TypeMeta::with_max_length(255);
//! let result = map_source_type("varchar", Some(&meta), &MapperOptions::default())?;
//! println!("{} ({:.2})", result.canon_type, result.confidence);
//! ```

pub(crate) mod classify;
mod error;

use std::time::Instant;

use serde::{Deserialize, Serialize};

pub use error::MapperError;

use crate::cache::{encode_cache_key, with_active_cache};
use crate::telemetry::{self, TelemetryEvent};
use crate::types::{CanonicalType, MappingResult, TypeMeta};

pub use classify::classify_source_type;

/// How the mapper treats source types it cannot resolve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapMode {
    /// Unknown, domain, and composite types are errors
    Strict,
    /// Unknown, domain, and composite types degrade to a lossy fallback
    #[default]
    Loose,
}

impl std::fmt::Display for MapMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapMode::Strict => write!(f, "strict"),
            MapMode::Loose => write!(f, "loose"),
        }
    }
}

impl std::str::FromStr for MapMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(MapMode::Strict),
            "loose" => Ok(MapMode::Loose),
            _ => Err(format!("Unknown map mode: {}", s)),
        }
    }
}

/// Options for a mapping call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapperOptions {
    /// Unknown-type handling, default loose
    pub mode: MapMode,
}

impl MapperOptions {
    /// Options with default values (loose mode)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mapping mode
    pub fn with_mode(mut self, mode: MapMode) -> Self {
        self.mode = mode;
        self
    }

    /// Strict options
    pub fn strict() -> Self {
        Self {
            mode: MapMode::Strict,
        }
    }
}

/// Map a PostgreSQL source type to its canonical classification
///
/// Consults the active mapping cache first; on a miss the pure core runs,
/// the result is cached, and a timed telemetry event is emitted. Errors
/// from strict mode are not cached.
pub fn map_source_type(
    source_type: &str,
    meta: Option<&TypeMeta>,
    opts: &MapperOptions,
) -> Result<MappingResult, MapperError> {
    let key = encode_cache_key(source_type, meta, opts.mode);

    if let Some(hit) = with_active_cache(|cache| cache.get(&key)) {
        tracing::trace!(source_type, "mapping cache hit");
        if telemetry::enabled() {
            telemetry::record(TelemetryEvent {
                operation: "map_source_type".to_string(),
                duration_ms: 0.0,
                confidence: Some(hit.confidence),
                reason_codes: Some(hit.reason_codes.clone()),
                from_type: Some(source_type.to_string()),
                to_type: Some(hit.canon_type),
                cached: Some(true),
            });
        }
        return Ok(hit);
    }

    tracing::debug!(source_type, mode = %opts.mode, "mapping cache miss, classifying");
    let started = Instant::now();
    let result = classify::classify_source_type(source_type, meta, opts.mode)?;
    let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

    with_active_cache(|cache| cache.insert(key, result.clone()));

    if telemetry::enabled() {
        telemetry::record(TelemetryEvent {
            operation: "map_source_type".to_string(),
            duration_ms,
            confidence: Some(result.confidence),
            reason_codes: Some(result.reason_codes.clone()),
            from_type: Some(source_type.to_string()),
            to_type: Some(result.canon_type),
            cached: Some(false),
        });
    }

    Ok(result)
}

/// A source column to map: type plus nullability and metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInput {
    /// Column name, carried through for caller bookkeeping only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The PostgreSQL type name
    pub source_type: String,
    /// Whether the column accepts NULL (default: true)
    #[serde(default = "default_true")]
    pub nullable: bool,
    /// Length/precision metadata
    #[serde(default, flatten)]
    pub meta: TypeMeta,
    /// Unknown-type handling for this column
    #[serde(default)]
    pub mode: MapMode,
}

fn default_true() -> bool {
    true
}

/// Column-shaped mapping result: canonical type plus passthrough metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    /// The canonical classification
    pub canon_type: CanonicalType,
    /// True iff the source column was NOT NULL
    pub is_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    /// Confidence of the underlying type mapping
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Map a column descriptor: the type mapping composed with nullability and
/// metadata passthrough
pub fn map_column(input: &ColumnInput) -> Result<ColumnMapping, MapperError> {
    let result = map_source_type(
        &input.source_type,
        Some(&input.meta),
        &MapperOptions { mode: input.mode },
    )?;

    Ok(ColumnMapping {
        canon_type: result.canon_type,
        is_required: !input.nullable,
        max_length: input.meta.max_length,
        precision: input.meta.precision,
        scale: input.meta.scale,
        confidence: result.confidence,
        notes: result.notes,
    })
}
