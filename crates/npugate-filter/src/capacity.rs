//! Capacity resolution — total units a target offers.

use npugate_core::Target;
use npugate_core::config::CapacityConfig;

use crate::error::ResolutionError;

/// Capacity found on a target, with the key it was read under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCapacity {
    pub resource_key: String,
    pub total: u64,
}

pub trait CapacityResolutionStrategy: Send + Sync {
    /// Resource-type key this target's capacity lives under.
    fn resource_key(&self, target: &Target) -> Result<String, ResolutionError>;

    fn resolve(&self, target: &Target) -> Result<ResolvedCapacity, ResolutionError> {
        let resource_key = self.resource_key(target)?;
        match target.capacity.get(&resource_key) {
            Some(&total) => Ok(ResolvedCapacity {
                resource_key,
                total,
            }),
            None => Err(ResolutionError::ResourceNotFound {
                target: target.name.clone(),
                resource_key,
            }),
        }
    }
}

/// One vendor resource name for every target.
#[derive(Debug, Clone)]
pub struct FixedKeyStrategy {
    resource_key: String,
}

impl FixedKeyStrategy {
    pub fn new(resource_key: impl Into<String>) -> Self {
        Self {
            resource_key: resource_key.into(),
        }
    }
}

impl CapacityResolutionStrategy for FixedKeyStrategy {
    fn resource_key(&self, _target: &Target) -> Result<String, ResolutionError> {
        Ok(self.resource_key.clone())
    }
}

/// Key built from two target attributes, e.g. `ascend-ci.com/910b`.
#[derive(Debug, Clone)]
pub struct CompositeKeyStrategy {
    domain_attribute: String,
    model_attribute: String,
    separator: String,
}

impl CompositeKeyStrategy {
    pub fn new(
        domain_attribute: impl Into<String>,
        model_attribute: impl Into<String>,
        separator: impl Into<String>,
    ) -> Self {
        Self {
            domain_attribute: domain_attribute.into(),
            model_attribute: model_attribute.into(),
            separator: separator.into(),
        }
    }

    fn attribute<'t>(&self, target: &'t Target, name: &str) -> Result<&'t str, ResolutionError> {
        target
            .attributes
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ResolutionError::AttributeMissing {
                target: target.name.clone(),
                attribute: name.to_string(),
            })
    }
}

impl CapacityResolutionStrategy for CompositeKeyStrategy {
    fn resource_key(&self, target: &Target) -> Result<String, ResolutionError> {
        let domain = self.attribute(target, &self.domain_attribute)?;
        let model = self.attribute(target, &self.model_attribute)?;
        Ok(format!("{domain}{}{model}", self.separator))
    }
}

pub fn resolver_from_config(config: &CapacityConfig) -> Box<dyn CapacityResolutionStrategy> {
    match config {
        CapacityConfig::FixedKey { resource_key } => {
            Box::new(FixedKeyStrategy::new(resource_key.clone()))
        }
        CapacityConfig::CompositeKey {
            domain_attribute,
            model_attribute,
            separator,
        } => Box::new(CompositeKeyStrategy::new(
            domain_attribute.clone(),
            model_attribute.clone(),
            separator.clone(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composite() -> CompositeKeyStrategy {
        CompositeKeyStrategy::new("resource-domain", "resource-model", "/")
    }

    #[test]
    fn fixed_key_reads_counter() {
        let target = Target::new("n1").with_capacity("huawei.com/ascend-1980", 8);
        let cap = FixedKeyStrategy::new("huawei.com/ascend-1980")
            .resolve(&target)
            .unwrap();
        assert_eq!(cap.total, 8);
        assert_eq!(cap.resource_key, "huawei.com/ascend-1980");
    }

    #[test]
    fn fixed_key_missing_counter() {
        let target = Target::new("n1").with_capacity("nvidia.com/gpu", 4);
        let err = FixedKeyStrategy::new("huawei.com/ascend-1980")
            .resolve(&target)
            .unwrap_err();
        assert_eq!(
            err,
            ResolutionError::ResourceNotFound {
                target: "n1".to_string(),
                resource_key: "huawei.com/ascend-1980".to_string(),
            }
        );
    }

    #[test]
    fn zero_capacity_is_resolved_not_missing() {
        let target = Target::new("n1").with_capacity("huawei.com/ascend-1980", 0);
        let cap = FixedKeyStrategy::new("huawei.com/ascend-1980")
            .resolve(&target)
            .unwrap();
        assert_eq!(cap.total, 0);
    }

    #[test]
    fn composite_key_resolves() {
        let target = Target::new("n1")
            .with_attribute("resource-domain", "ascend-ci.com")
            .with_attribute("resource-model", "910b")
            .with_capacity("ascend-ci.com/910b", 8);
        let cap = composite().resolve(&target).unwrap();
        assert_eq!(cap.total, 8);
        assert_eq!(cap.resource_key, "ascend-ci.com/910b");
    }

    #[test]
    fn composite_missing_domain() {
        let target = Target::new("n1")
            .with_attribute("resource-model", "910b")
            .with_capacity("ascend-ci.com/910b", 8);
        let err = composite().resolve(&target).unwrap_err();
        let ResolutionError::AttributeMissing { attribute, .. } = err else {
            panic!("expected AttributeMissing, got {err:?}");
        };
        assert_eq!(attribute, "resource-domain");
    }

    #[test]
    fn composite_missing_model() {
        let target = Target::new("n1").with_attribute("resource-domain", "ascend-ci.com");
        let err = composite().resolve(&target).unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::AttributeMissing { ref attribute, .. } if attribute == "resource-model"
        ));
    }

    #[test]
    fn composite_key_without_counter() {
        let target = Target::new("n1")
            .with_attribute("resource-domain", "ascend-ci.com")
            .with_attribute("resource-model", "310p")
            .with_capacity("ascend-ci.com/910b", 8);
        let err = composite().resolve(&target).unwrap_err();
        let ResolutionError::ResourceNotFound { resource_key, .. } = err else {
            panic!("expected ResourceNotFound, got {err:?}");
        };
        assert_eq!(resource_key, "ascend-ci.com/310p");
    }

    #[test]
    fn composite_separator_is_configurable() {
        let target = Target::new("n1")
            .with_attribute("d", "vendor")
            .with_attribute("m", "x1")
            .with_capacity("vendor.x1", 2);
        let cap = CompositeKeyStrategy::new("d", "m", ".").resolve(&target).unwrap();
        assert_eq!(cap.total, 2);
    }
}
