//! Shared types used across npugate crates.
//!
//! These are the per-call snapshot handed to the filter by the
//! orchestrator. Nothing here is mutated during evaluation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Resource-type key, e.g. `huawei.com/ascend-1980`.
pub type ResourceKey = String;

// ── Workload ───────────────────────────────────────────────────────

/// A schedulable unit (e.g. a runner pod).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workload {
    /// Opaque identifier; legacy naming encodes the demand positionally.
    pub identifier: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// Whether the workload already occupies capacity on its target.
    /// Entries on a target that are only nominated carry `false`.
    #[serde(default = "default_committed")]
    pub committed: bool,
}

fn default_committed() -> bool {
    true
}

impl Workload {
    /// A workload under evaluation, not yet holding capacity anywhere.
    pub fn candidate(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            metadata: HashMap::new(),
            committed: false,
        }
    }

    /// A workload already bound to a target.
    pub fn committed(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            metadata: HashMap::new(),
            committed: true,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

// ── Target ─────────────────────────────────────────────────────────

/// A placement host with finite typed capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    /// Descriptive attributes (node labels).
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    /// Total allocatable units per resource type.
    #[serde(default)]
    pub capacity: HashMap<ResourceKey, u64>,
    /// Pre-aggregated requested units per resource type, as reported by
    /// the orchestrator. Only read by the `requested-counter` allocation.
    #[serde(default)]
    pub requested: HashMap<ResourceKey, u64>,
    /// Workloads currently assigned to this target.
    #[serde(default)]
    pub workloads: Vec<Workload>,
}

impl Target {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: HashMap::new(),
            capacity: HashMap::new(),
            requested: HashMap::new(),
            workloads: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_capacity(mut self, key: impl Into<ResourceKey>, units: u64) -> Self {
        self.capacity.insert(key.into(), units);
        self
    }

    pub fn with_requested(mut self, key: impl Into<ResourceKey>, units: u64) -> Self {
        self.requested.insert(key.into(), units);
        self
    }

    pub fn with_workload(mut self, workload: Workload) -> Self {
        self.workloads.push(workload);
        self
    }
}

// ── Demand ─────────────────────────────────────────────────────────

/// Outcome of a successful demand extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Demand {
    /// The workload claims this many units.
    Declared(u64),
    /// The workload makes no resource claim. Contributes nothing.
    NotDeclared,
}

// ── Decision ───────────────────────────────────────────────────────

/// Terminal output of one admission check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionDecision {
    pub admit: bool,
    /// Always populated. Safe to log verbatim.
    pub reason: String,
}

impl AdmissionDecision {
    pub fn admit(reason: impl Into<String>) -> Self {
        Self {
            admit: true,
            reason: reason.into(),
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            admit: false,
            reason: reason.into(),
        }
    }

    pub fn label(&self) -> &'static str {
        if self.admit { "ADMIT" } else { "REJECT" }
    }
}

impl fmt::Display for AdmissionDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label(), self.reason)
    }
}
