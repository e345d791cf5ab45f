use std::path::Path;

use anyhow::{Context, bail};
use npugate_core::FilterConfig;

/// Config from `path`, or the built-in defaults when none is given.
pub fn load(path: Option<&Path>) -> anyhow::Result<FilterConfig> {
    match path {
        Some(path) => FilterConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(FilterConfig::default()),
    }
}

pub fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let content = FilterConfig::default().to_toml_string()?;
    std::fs::write(path, content)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("✓ Generated {}", path.display());
    Ok(())
}

pub fn show(path: Option<&Path>) -> anyhow::Result<()> {
    let config = load(path)?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use npugate_core::config::CapacityConfig;

    #[test]
    fn init_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("npugate.toml");

        init(&path, false).unwrap();
        let config = load(Some(&path)).unwrap();
        assert_eq!(config, FilterConfig::default());
    }

    #[test]
    fn init_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("npugate.toml");
        std::fs::write(&path, "[plugin]\nname = \"mine\"\n").unwrap();

        assert!(init(&path, false).is_err());
        assert_eq!(load(Some(&path)).unwrap().plugin.name, "mine");

        init(&path, true).unwrap();
        assert_eq!(load(Some(&path)).unwrap().plugin.name, "npu-fit");
    }

    #[test]
    fn load_reads_strategy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("npugate.toml");
        std::fs::write(&path, "[capacity]\nstrategy = \"composite-key\"\n").unwrap();

        let config = load(Some(&path)).unwrap();
        assert!(matches!(config.capacity, CapacityConfig::CompositeKey { .. }));
    }

    #[test]
    fn load_reports_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("npugate.toml");
        std::fs::write(&path, "[demand]\nstrategy = \"metadata-key\"\nkey = \"\"\n").unwrap();

        let err = load(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("demand.key"));
    }

    #[test]
    fn missing_path_means_defaults() {
        assert_eq!(load(None).unwrap(), FilterConfig::default());
    }
}
