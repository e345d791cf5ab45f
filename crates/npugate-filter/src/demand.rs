//! Demand extraction — how many units a workload asks for.
//!
//! Two conventions exist in deployed clusters:
//! - **Metadata key**: a well-known metadata entry holds the count. Absent
//!   means the workload makes no claim.
//! - **Positional identifier** (legacy): the count is one segment of the
//!   identifier, e.g. `linux-arm64-npu-2-7cksd-runner-7cf2c` → 2. There is
//!   no "not declared" state; it either parses or fails.

use npugate_core::Workload;
use npugate_core::config::DemandConfig;
use npugate_core::types::Demand;

use crate::error::ExtractionError;

/// Capability shared by every extraction convention.
pub trait DemandExtractionStrategy: Send + Sync {
    fn extract(&self, workload: &Workload) -> Result<Demand, ExtractionError>;
}

/// Reads the count from a metadata key.
#[derive(Debug, Clone)]
pub struct MetadataKeyStrategy {
    key: String,
}

impl MetadataKeyStrategy {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl DemandExtractionStrategy for MetadataKeyStrategy {
    fn extract(&self, workload: &Workload) -> Result<Demand, ExtractionError> {
        let Some(raw) = workload.metadata.get(&self.key) else {
            return Ok(Demand::NotDeclared);
        };
        parse_count(raw, || format!("metadata key `{}`", self.key)).map(Demand::Declared)
    }
}

/// Splits the identifier on a delimiter and parses one segment.
#[derive(Debug, Clone)]
pub struct PositionalIdentifierStrategy {
    delimiter: String,
    segment_index: usize,
}

impl PositionalIdentifierStrategy {
    pub fn new(delimiter: impl Into<String>, segment_index: usize) -> Self {
        Self {
            delimiter: delimiter.into(),
            segment_index,
        }
    }
}

impl DemandExtractionStrategy for PositionalIdentifierStrategy {
    fn extract(&self, workload: &Workload) -> Result<Demand, ExtractionError> {
        let id = &workload.identifier;
        let Some(segment) = id.split(self.delimiter.as_str()).nth(self.segment_index) else {
            return Err(ExtractionError::TooFewSegments {
                identifier: id.clone(),
                found: id.split(self.delimiter.as_str()).count(),
                needed: self.segment_index + 1,
            });
        };
        parse_count(segment, || {
            format!("segment {} of identifier `{id}`", self.segment_index)
        })
        .map(Demand::Declared)
    }
}

/// Base-10, unsigned. Negative counts are malformed.
fn parse_count(raw: &str, origin: impl FnOnce() -> String) -> Result<u64, ExtractionError> {
    raw.parse::<u64>().map_err(|source| ExtractionError::InvalidCount {
        origin: origin(),
        value: raw.to_string(),
        source,
    })
}

/// Build the configured strategy.
pub fn extractor_from_config(config: &DemandConfig) -> Box<dyn DemandExtractionStrategy> {
    match config {
        DemandConfig::MetadataKey { key } => Box::new(MetadataKeyStrategy::new(key.clone())),
        DemandConfig::PositionalIdentifier {
            delimiter,
            segment_index,
        } => Box::new(PositionalIdentifierStrategy::new(delimiter.clone(), *segment_index)),
    }
}
