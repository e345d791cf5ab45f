//! Admission decision — can this target host this workload right now?
//!
//! Per call:
//! 1. Extract the candidate's demand (no claim → admit, malformed → reject)
//! 2. Resolve the target's capacity (failure → reject)
//! 3. Aggregate what is already committed on the target
//! 4. Admit iff `capacity - committed >= demand`
//!
//! Every path ends in an [`AdmissionDecision`]; errors become reject
//! reasons and never reach the caller.
//!
//! # Known limitation
//!
//! Capacity is read and compared without any lock against the commit
//! that follows. Two concurrent checks for the same target can both see
//! the same free units and both admit. Closing that race belongs to the
//! commit protocol (re-check on bind, or a serialized commit phase).

use npugate_core::config::AllocationStrategy;
use npugate_core::types::Demand;
use npugate_core::{AdmissionDecision, FilterConfig, Target, Workload};
use tracing::{debug, info, warn};

use crate::allocation::aggregate;
use crate::capacity::{CapacityResolutionStrategy, resolver_from_config};
use crate::demand::{DemandExtractionStrategy, extractor_from_config};
use crate::error::FilterResult;

/// Stateless admission check. Safe to share across threads.
pub struct AdmissionDecider {
    extractor: Box<dyn DemandExtractionStrategy>,
    resolver: Box<dyn CapacityResolutionStrategy>,
    allocation: AllocationStrategy,
}

impl AdmissionDecider {
    pub fn new(
        extractor: Box<dyn DemandExtractionStrategy>,
        resolver: Box<dyn CapacityResolutionStrategy>,
        allocation: AllocationStrategy,
    ) -> Self {
        Self {
            extractor,
            resolver,
            allocation,
        }
    }

    /// Build from a validated config.
    pub fn from_config(config: &FilterConfig) -> FilterResult<Self> {
        config.validate()?;
        Ok(Self::new(
            extractor_from_config(&config.demand),
            resolver_from_config(&config.capacity),
            config.allocation.strategy,
        ))
    }

    pub fn evaluate(&self, workload: &Workload, target: &Target) -> AdmissionDecision {
        let demand = match self.extractor.extract(workload) {
            Ok(Demand::Declared(units)) => units,
            Ok(Demand::NotDeclared) => {
                debug!(
                    workload = %workload.identifier,
                    target = %target.name,
                    "no demand declared"
                );
                return AdmissionDecision::admit(format!(
                    "no resource requirement declared by workload {}",
                    workload.identifier
                ));
            }
            Err(e) => {
                warn!(workload = %workload.identifier, error = %e, "malformed demand declaration");
                return AdmissionDecision::reject(format!(
                    "malformed resource requirement on workload {}: {e}",
                    workload.identifier
                ));
            }
        };

        let capacity = match self.resolver.resolve(target) {
            Ok(capacity) => capacity,
            Err(e) => {
                warn!(target = %target.name, error = %e, "cannot resolve capacity");
                return AdmissionDecision::reject(format!(
                    "cannot determine resource capacity on target {}: {e}",
                    target.name
                ));
            }
        };

        let committed = aggregate(
            self.allocation,
            target,
            &capacity.resource_key,
            self.extractor.as_ref(),
        );

        debug!(
            workload = %workload.identifier,
            target = %target.name,
            resource = %capacity.resource_key,
            capacity = capacity.total,
            committed = committed.total,
            demand,
            considered = ?committed.considered,
            skipped = committed.skipped.len(),
            "evaluating admission"
        );

        // Free may go negative on an over-committed target; compare, don't clamp.
        let free = i128::from(capacity.total) - i128::from(committed.total);
        let summary = format!(
            "target={}, resource={}, capacity={}, committed={}, demand={}, free={free}",
            target.name, capacity.resource_key, capacity.total, committed.total, demand
        );

        if free >= i128::from(demand) {
            info!(
                workload = %workload.identifier,
                target = %target.name,
                demand,
                free = %free,
                "admitted"
            );
            AdmissionDecision::admit(format!("sufficient resource capacity: {summary}"))
        } else {
            info!(
                workload = %workload.identifier,
                target = %target.name,
                demand,
                free = %free,
                "rejected"
            );
            AdmissionDecision::reject(format!("insufficient resource capacity: {summary}"))
        }
    }
}
