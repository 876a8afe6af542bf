//! Type Mapping Core - type mapping and compatibility engine for
//! schema-driven applications
//!
//! Converts heterogeneous, externally-supplied type descriptors
//! (PostgreSQL column types, raw sample values from tabular imports)
//! into a single canonical type vocabulary. Every result is deterministic
//! and explainable: it carries a confidence score, ordered reason codes,
//! and warnings for lossy paths.
//!
//! Provides:
//! - PostgreSQL type mapping (pure core + cached, instrumented wrapper)
//! - CSV column type inference from sample values
//! - A total compatibility matrix over the canonical vocabulary
//! - A bounded mapping cache with scoped batch contexts
//! - A custom-mapping registry with priority/source conflict resolution
//! - An unknown-type fallback policy and an optional telemetry hook

pub mod cache;
pub mod compat;
pub mod inference;
pub mod mapper;
pub mod policy;
pub mod reason;
pub mod registry;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use types::{
    CanonicalType, MappingResult, MappingWarning, ReasonCode, TypeMeta, confidence,
};

pub use compat::{
    CompatLevel, compat_level_of, get_compat_level, is_compatible, requires_transform,
};

pub use mapper::{
    ColumnInput, ColumnMapping, MapMode, MapperError, MapperOptions, classify_source_type,
    map_column, map_source_type,
};

pub use inference::{
    InferenceOptions, SampleStrategy, infer_column_type, refine_by_distinct_values,
};

pub use reason::build_reason_codes;

pub use cache::{
    MappingCache, ScopedContext, clear_global_cache, create_scoped_context, encode_cache_key,
    with_scoped_context,
};

pub use registry::{CustomMappingRegistry, CustomTypeMapping, MappingSource, RegistryError};

pub use policy::{PolicyAction, UnknownTypePolicy, apply_unknown_type_policy};

pub use telemetry::{TelemetryCallback, TelemetryEvent, set_telemetry};
