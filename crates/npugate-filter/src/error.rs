//! Filter error types.

use std::num::ParseIntError;

use npugate_core::config::ConfigError;
use thiserror::Error;

/// A workload's demand declaration is present but unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("identifier `{identifier}` has {found} segments, need at least {needed}")]
    TooFewSegments {
        identifier: String,
        found: usize,
        needed: usize,
    },

    #[error("invalid resource count `{value}` in {origin}: {source}")]
    InvalidCount {
        origin: String,
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// A target's capacity cannot be determined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("target {target} is missing attribute `{attribute}`")]
    AttributeMissing { target: String, attribute: String },

    #[error("target {target} has no capacity counter for `{resource_key}`")]
    ResourceNotFound { target: String, resource_key: String },
}

/// Errors surfaced while building the filter.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("unknown plugin: {0}")]
    UnknownPlugin(String),
}

pub type FilterResult<T> = Result<T, FilterError>;
