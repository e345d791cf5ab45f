//! Allocation aggregation — units already committed on a target.
//!
//! Recomputed on every call from the snapshot; there is no cache. A
//! neighbour with bad data is skipped, never allowed to fail the pass.

use npugate_core::config::AllocationStrategy;
use npugate_core::types::Demand;
use npugate_core::{Target, Workload};
use tracing::{debug, warn};

use crate::demand::DemandExtractionStrategy;

/// Committed total on a target plus what went into it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
    pub total: u64,
    /// Identifiers of workloads whose declared demand was summed.
    pub considered: Vec<String>,
    /// Workloads excluded from the sum, with the reason.
    pub skipped: Vec<SkippedWorkload>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedWorkload {
    pub identifier: String,
    pub reason: String,
}

/// Sum declared demand across committed workloads in one pass.
pub fn sum_committed_demand(
    workloads: &[Workload],
    extractor: &dyn DemandExtractionStrategy,
) -> Allocation {
    let mut allocation = Allocation::default();

    for workload in workloads {
        if !workload.committed {
            allocation.skip(workload, "not committed".to_string());
            continue;
        }
        match extractor.extract(workload) {
            Ok(Demand::Declared(units)) => match allocation.total.checked_add(units) {
                Some(total) => {
                    allocation.total = total;
                    allocation.considered.push(workload.identifier.clone());
                }
                None => {
                    warn!(
                        workload = %workload.identifier,
                        units,
                        total = allocation.total,
                        "excluding committed workload whose demand overflows the total"
                    );
                    let reason = format!(
                        "demand {units} overflows committed total {}",
                        allocation.total
                    );
                    allocation.skip(workload, reason);
                }
            },
            Ok(Demand::NotDeclared) => {
                allocation.skip(workload, "no resource requirement declared".to_string());
            }
            Err(e) => {
                warn!(
                    workload = %workload.identifier,
                    error = %e,
                    "excluding committed workload with malformed demand"
                );
                allocation.skip(workload, e.to_string());
            }
        }
    }

    allocation
}

/// Use the orchestrator's requested counter; absent means nothing requested.
pub fn requested_counter(target: &Target, resource_key: &str) -> Allocation {
    let total = match target.requested.get(resource_key) {
        Some(&units) => units,
        None => {
            debug!(
                target = %target.name,
                resource = resource_key,
                "no requested counter, treating as zero"
            );
            0
        }
    };
    Allocation {
        total,
        considered: Vec::new(),
        skipped: Vec::new(),
    }
}

/// Committed total on `target` under the configured strategy.
pub fn aggregate(
    strategy: AllocationStrategy,
    target: &Target,
    resource_key: &str,
    extractor: &dyn DemandExtractionStrategy,
) -> Allocation {
    match strategy {
        AllocationStrategy::CommittedDemand => sum_committed_demand(&target.workloads, extractor),
        AllocationStrategy::RequestedCounter => requested_counter(target, resource_key),
    }
}

impl Allocation {
    fn skip(&mut self, workload: &Workload, reason: String) {
        debug!(workload = %workload.identifier, %reason, "skipped in allocation");
        self.skipped.push(SkippedWorkload {
            identifier: workload.identifier.clone(),
            reason,
        });
    }
}
