//! npugate-filter — NPU capacity admission for a scheduling cycle.
//!
//! Decides whether a candidate target has enough free accelerator units
//! for a workload. Pure computation over a per-call snapshot: no I/O, no
//! shared state, nothing mutated.
//!
//! # Components
//!
//! - **`demand`** — How many units a workload asks for (metadata key or legacy name)
//! - **`capacity`** — Total units on a target (fixed key or domain/model key)
//! - **`allocation`** — Units already committed on a target
//! - **`admission`** — The admit/reject decision
//! - **`plugin`** — Filter and pre-score extension points, plugin registry
//!
//! ```text
//! AdmissionDecider
//!   ├── DemandExtractionStrategy (candidate)
//!   ├── CapacityResolutionStrategy (target)
//!   └── allocation::aggregate (committed workloads → DemandExtractionStrategy)
//! ```

pub mod admission;
pub mod allocation;
pub mod capacity;
pub mod demand;
pub mod error;
pub mod plugin;

pub use admission::AdmissionDecider;
pub use allocation::{
    Allocation, SkippedWorkload, aggregate, requested_counter, sum_committed_demand,
};
pub use capacity::{
    CapacityResolutionStrategy, CompositeKeyStrategy, FixedKeyStrategy, ResolvedCapacity,
    resolver_from_config,
};
pub use demand::{
    DemandExtractionStrategy, MetadataKeyStrategy, PositionalIdentifierStrategy,
    extractor_from_config,
};
pub use error::{ExtractionError, FilterError, FilterResult, ResolutionError};
pub use plugin::{
    FilterPlugin, NpuFitPlugin, PluginRegistry, PreScorePlugin, SchedulerPlugin, Status,
    StatusCode,
};
