//! Scheduler plugin surface.
//!
//! The orchestrator drives two extension points per scheduling cycle:
//! a pre-score pass over the feasible targets, and a filter call per
//! (workload, target) pair. `NpuFitPlugin` implements both; only the
//! filter makes a decision.

use std::collections::HashMap;
use std::fmt;

use npugate_core::{FilterConfig, Target, Workload};
use tracing::debug;

use crate::admission::AdmissionDecider;
use crate::error::{FilterError, FilterResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Success,
    Unschedulable,
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCode::Success => write!(f, "success"),
            StatusCode::Unschedulable => write!(f, "unschedulable"),
        }
    }
}

/// Result of a plugin extension point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub code: StatusCode,
    pub message: String,
}

impl Status {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            code: StatusCode::Success,
            message: message.into(),
        }
    }

    pub fn unschedulable(message: impl Into<String>) -> Self {
        Self {
            code: StatusCode::Unschedulable,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == StatusCode::Success
    }
}

pub trait FilterPlugin: Send + Sync {
    fn name(&self) -> &str;

    fn filter(&self, workload: &Workload, target: &Target) -> Status;
}

/// Advisory stage run before scoring. Must not reject.
pub trait PreScorePlugin: Send + Sync {
    fn pre_score(&self, workload: &Workload, targets: &[Target]) -> Status;
}

/// Filters out targets without enough free NPU units.
pub struct NpuFitPlugin {
    name: String,
    decider: AdmissionDecider,
}

impl NpuFitPlugin {
    pub fn new(config: &FilterConfig) -> FilterResult<Self> {
        Ok(Self {
            name: config.plugin.name.clone(),
            decider: AdmissionDecider::from_config(config)?,
        })
    }
}

impl FilterPlugin for NpuFitPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn filter(&self, workload: &Workload, target: &Target) -> Status {
        let decision = self.decider.evaluate(workload, target);
        if decision.admit {
            Status::success(decision.reason)
        } else {
            Status::unschedulable(decision.reason)
        }
    }
}

impl PreScorePlugin for NpuFitPlugin {
    fn pre_score(&self, workload: &Workload, targets: &[Target]) -> Status {
        debug!(
            plugin = %self.name,
            workload = %workload.identifier,
            targets = targets.len(),
            "pre-score"
        );
        Status::success(format!("Pod: {}", workload.identifier))
    }
}

/// Plugin able to serve both extension points.
pub trait SchedulerPlugin: FilterPlugin + PreScorePlugin {}

impl<T: FilterPlugin + PreScorePlugin> SchedulerPlugin for T {}

pub type PluginFactory = fn(&FilterConfig) -> FilterResult<Box<dyn SchedulerPlugin>>;

fn build_npu_fit(config: &FilterConfig) -> FilterResult<Box<dyn SchedulerPlugin>> {
    Ok(Box::new(NpuFitPlugin::new(config)?))
}

/// Kind → factory lookup used at startup.
#[derive(Default)]
pub struct PluginRegistry {
    factories: HashMap<String, PluginFactory>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in plugin.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(npugate_core::config::DEFAULT_PLUGIN_KIND, build_npu_fit);
        registry
    }

    pub fn register(&mut self, kind: impl Into<String>, factory: PluginFactory) {
        self.factories.insert(kind.into(), factory);
    }

    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Instantiate the plugin of kind `config.plugin.kind`. The built
    /// plugin reports `config.plugin.name`.
    pub fn build(&self, config: &FilterConfig) -> FilterResult<Box<dyn SchedulerPlugin>> {
        let factory = self
            .factories
            .get(&config.plugin.kind)
            .ok_or_else(|| FilterError::UnknownPlugin(config.plugin.kind.clone()))?;
        factory(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "required-resource-count";
    const NPU: &str = "huawei.com/ascend-1980";

    fn plugin() -> NpuFitPlugin {
        NpuFitPlugin::new(&FilterConfig::default()).unwrap()
    }

    #[test]
    fn filter_maps_decision_to_status() {
        let target = Target::new("n1").with_capacity(NPU, 2);

        let fits = Workload::candidate("a").with_metadata(KEY, "2");
        assert!(plugin().filter(&fits, &target).is_success());

        let too_big = Workload::candidate("b").with_metadata(KEY, "3");
        let status = plugin().filter(&too_big, &target);
        assert_eq!(status.code, StatusCode::Unschedulable);
        assert!(status.message.contains("insufficient"));
    }

    #[test]
    fn pre_score_always_succeeds() {
        let w = Workload::candidate("runner-1").with_metadata(KEY, "garbage");
        let status = plugin().pre_score(&w, &[]);
        assert_eq!(status, Status::success("Pod: runner-1"));
    }

    #[test]
    fn plugin_name_comes_from_config() {
        assert_eq!(plugin().name(), "npu-fit");
    }

    #[test]
    fn registry_builds_default_plugin() {
        let registry = PluginRegistry::with_defaults();
        assert_eq!(registry.kinds(), vec!["npu-fit"]);
        let built = registry.build(&FilterConfig::default()).unwrap();
        assert_eq!(built.name(), "npu-fit");
    }

    #[test]
    fn renamed_plugin_builds_without_extra_registration() {
        let mut config = FilterConfig::default();
        config.plugin.name = "labelAB".to_string();
        let built = PluginRegistry::with_defaults().build(&config).unwrap();
        assert_eq!(built.name(), "labelAB");
    }

    #[test]
    fn registry_rejects_unknown_kind() {
        let mut config = FilterConfig::default();
        config.plugin.kind = "gpu-fit".to_string();
        let err = PluginRegistry::with_defaults().build(&config).err().unwrap();
        assert!(matches!(err, FilterError::UnknownPlugin(ref k) if k == "gpu-fit"));
    }

    #[test]
    fn registered_kind_is_buildable() {
        let mut registry = PluginRegistry::new();
        registry.register("legacy-npu-fit", build_npu_fit);
        let mut config = FilterConfig::default();
        config.plugin.kind = "legacy-npu-fit".to_string();
        assert_eq!(registry.build(&config).unwrap().name(), "npu-fit");
    }
}
