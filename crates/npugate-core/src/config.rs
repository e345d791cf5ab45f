//! npugate.toml configuration parser.
//!
//! Selects which demand-extraction, capacity-resolution and allocation
//! strategy a deployment uses, and names the keys they read. Strategies
//! are picked here once; the filter never guesses from the data.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_PLUGIN_KIND: &str = "npu-fit";
pub const DEFAULT_PLUGIN_NAME: &str = "npu-fit";
pub const DEFAULT_DEMAND_KEY: &str = "required-resource-count";
pub const DEFAULT_DELIMITER: &str = "-";
pub const DEFAULT_SEGMENT_INDEX: usize = 3;
pub const DEFAULT_RESOURCE_KEY: &str = "huawei.com/ascend-1980";
pub const DEFAULT_DOMAIN_ATTRIBUTE: &str = "resource-domain";
pub const DEFAULT_MODEL_ATTRIBUTE: &str = "resource-model";
pub const DEFAULT_SEPARATOR: &str = "/";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub plugin: PluginConfig,
    #[serde(default)]
    pub demand: DemandConfig,
    #[serde(default)]
    pub capacity: CapacityConfig,
    #[serde(default)]
    pub allocation: AllocationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Which registered plugin implementation to build.
    #[serde(default = "default_plugin_kind")]
    pub kind: String,
    /// Name the plugin reports to the orchestrator.
    #[serde(default = "default_plugin_name")]
    pub name: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            kind: default_plugin_kind(),
            name: default_plugin_name(),
        }
    }
}

/// How a workload declares the number of units it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum DemandConfig {
    /// Parse a well-known metadata key.
    MetadataKey {
        #[serde(default = "default_demand_key")]
        key: String,
    },
    /// Legacy: split the identifier and parse one segment.
    PositionalIdentifier {
        #[serde(default = "default_delimiter")]
        delimiter: String,
        #[serde(default = "default_segment_index")]
        segment_index: usize,
    },
}

impl Default for DemandConfig {
    fn default() -> Self {
        DemandConfig::MetadataKey {
            key: default_demand_key(),
        }
    }
}

/// How a target's total capacity is looked up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum CapacityConfig {
    FixedKey {
        #[serde(default = "default_resource_key")]
        resource_key: String,
    },
    /// Key is `<domain><separator><model>`, both read from target attributes.
    CompositeKey {
        #[serde(default = "default_domain_attribute")]
        domain_attribute: String,
        #[serde(default = "default_model_attribute")]
        model_attribute: String,
        #[serde(default = "default_separator")]
        separator: String,
    },
}

impl Default for CapacityConfig {
    fn default() -> Self {
        CapacityConfig::FixedKey {
            resource_key: default_resource_key(),
        }
    }
}

/// Where the committed total on a target comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AllocationStrategy {
    /// Sum the declared demand of every committed workload.
    #[default]
    CommittedDemand,
    /// Read the orchestrator's pre-aggregated requested counter.
    RequestedCounter,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationConfig {
    #[serde(default)]
    pub strategy: AllocationStrategy,
}

fn default_plugin_kind() -> String {
    DEFAULT_PLUGIN_KIND.to_string()
}
fn default_plugin_name() -> String {
    DEFAULT_PLUGIN_NAME.to_string()
}
fn default_demand_key() -> String {
    DEFAULT_DEMAND_KEY.to_string()
}
fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}
fn default_segment_index() -> usize {
    DEFAULT_SEGMENT_INDEX
}
fn default_resource_key() -> String {
    DEFAULT_RESOURCE_KEY.to_string()
}
fn default_domain_attribute() -> String {
    DEFAULT_DOMAIN_ATTRIBUTE.to_string()
}
fn default_model_attribute() -> String {
    DEFAULT_MODEL_ATTRIBUTE.to_string()
}
fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

impl FilterConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FilterConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Config for clusters whose nodes carry a domain/model label pair
    /// instead of a single vendor resource name.
    pub fn composite() -> Self {
        FilterConfig {
            capacity: CapacityConfig::CompositeKey {
                domain_attribute: default_domain_attribute(),
                model_attribute: default_model_attribute(),
                separator: default_separator(),
            },
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        non_empty("plugin.kind", &self.plugin.kind)?;
        non_empty("plugin.name", &self.plugin.name)?;
        match &self.demand {
            DemandConfig::MetadataKey { key } => non_empty("demand.key", key)?,
            DemandConfig::PositionalIdentifier { delimiter, .. } => {
                non_empty("demand.delimiter", delimiter)?
            }
        }
        match &self.capacity {
            CapacityConfig::FixedKey { resource_key } => {
                non_empty("capacity.resource_key", resource_key)?
            }
            CapacityConfig::CompositeKey {
                domain_attribute,
                model_attribute,
                ..
            } => {
                non_empty("capacity.domain_attribute", domain_attribute)?;
                non_empty("capacity.model_attribute", model_attribute)?;
            }
        }
        Ok(())
    }
}

fn non_empty(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Empty { field });
    }
    Ok(())
}
