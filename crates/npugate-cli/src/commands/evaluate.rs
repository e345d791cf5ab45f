use std::path::Path;

use anyhow::{Context, bail};
use npugate_core::{AdmissionDecision, Target, Workload};
use npugate_filter::{FilterPlugin, PluginRegistry, PreScorePlugin, SchedulerPlugin};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::config;

/// One scheduling cycle's input: the candidate and every target considered.
#[derive(Debug, Deserialize)]
pub struct Snapshot {
    pub workload: Workload,
    #[serde(default)]
    pub targets: Vec<Target>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct TargetDecision {
    pub target: String,
    #[serde(flatten)]
    pub decision: AdmissionDecision,
}

impl TargetDecision {
    /// `target: ADMIT|REJECT: reason`
    pub fn to_text(&self) -> String {
        format!("{}: {}", self.target, self.decision)
    }
}

pub fn evaluate(
    snapshot_path: &Path,
    config_path: Option<&Path>,
    format: &str,
) -> anyhow::Result<()> {
    if !matches!(format, "text" | "json") {
        bail!("unknown format `{format}` (expected text or json)");
    }

    let config = config::load(config_path)?;
    let plugin = PluginRegistry::with_defaults().build(&config)?;

    let content = std::fs::read_to_string(snapshot_path)
        .with_context(|| format!("failed to read snapshot {}", snapshot_path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse snapshot {}", snapshot_path.display()))?;

    let decisions = run_cycle(plugin.as_ref(), &snapshot);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&decisions)?);
        }
        _ => {
            for d in &decisions {
                println!("{}", d.to_text());
            }
        }
    }

    Ok(())
}

/// Pre-score once, then filter every target.
pub fn run_cycle(plugin: &dyn SchedulerPlugin, snapshot: &Snapshot) -> Vec<TargetDecision> {
    let pre = plugin.pre_score(&snapshot.workload, &snapshot.targets);
    info!(plugin = plugin.name(), status = %pre.code, message = %pre.message, "pre-score done");

    let decisions: Vec<TargetDecision> = snapshot
        .targets
        .iter()
        .map(|target| {
            let status = plugin.filter(&snapshot.workload, target);
            let decision = if status.is_success() {
                AdmissionDecision::admit(status.message)
            } else {
                AdmissionDecision::reject(status.message)
            };
            TargetDecision {
                target: target.name.clone(),
                decision,
            }
        })
        .collect();

    let admitted = decisions.iter().filter(|d| d.decision.admit).count();
    info!(
        workload = %snapshot.workload.identifier,
        targets = decisions.len(),
        admitted,
        "filter done"
    );
    decisions
}

#[cfg(test)]
mod tests {
    use super::*;
    use npugate_core::FilterConfig;

    const SNAPSHOT: &str = r#"{
        "workload": {
            "identifier": "ci-runner",
            "metadata": { "required-resource-count": "2" },
            "committed": false
        },
        "targets": [
            {
                "name": "roomy",
                "capacity": { "huawei.com/ascend-1980": 8 },
                "workloads": [
                    { "identifier": "a", "metadata": { "required-resource-count": "3" } },
                    { "identifier": "b", "metadata": { "required-resource-count": "3" } }
                ]
            },
            {
                "name": "full",
                "capacity": { "huawei.com/ascend-1980": 8 },
                "workloads": [
                    { "identifier": "c", "metadata": { "required-resource-count": "7" } }
                ]
            },
            { "name": "cpu-only", "capacity": { "cpu": 64 } }
        ]
    }"#;

    #[test]
    fn cycle_filters_each_target() {
        let snapshot: Snapshot = serde_json::from_str(SNAPSHOT).unwrap();
        let plugin = PluginRegistry::with_defaults()
            .build(&FilterConfig::default())
            .unwrap();

        let decisions = run_cycle(plugin.as_ref(), &snapshot);

        let verdicts: Vec<(&str, bool)> = decisions
            .iter()
            .map(|d| (d.target.as_str(), d.decision.admit))
            .collect();
        assert_eq!(verdicts, vec![("roomy", true), ("full", false), ("cpu-only", false)]);
        assert!(decisions[1].decision.reason.contains("committed=7"));
    }

    #[test]
    fn text_and_json_render_the_decision() {
        let admitted = TargetDecision {
            target: "n1".to_string(),
            decision: AdmissionDecision::admit("fits"),
        };
        let rejected = TargetDecision {
            target: "n2".to_string(),
            decision: AdmissionDecision::reject("full"),
        };
        assert_eq!(admitted.to_text(), "n1: ADMIT: fits");
        assert_eq!(rejected.to_text(), "n2: REJECT: full");

        let json = serde_json::to_value(&rejected).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "target": "n2", "admit": false, "reason": "full" })
        );
    }

    #[test]
    fn evaluate_runs_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("snapshot.json");
        std::fs::write(&snapshot, SNAPSHOT).unwrap();

        evaluate(&snapshot, None, "json").unwrap();
        evaluate(&snapshot, None, "text").unwrap();
    }

    #[test]
    fn evaluate_rejects_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("snapshot.json");
        std::fs::write(&snapshot, SNAPSHOT).unwrap();

        assert!(evaluate(&snapshot, None, "yaml").is_err());
    }

    #[test]
    fn evaluate_reports_bad_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("snapshot.json");
        std::fs::write(&snapshot, "{ not json").unwrap();

        let err = evaluate(&snapshot, None, "text").unwrap_err();
        assert!(err.to_string().contains("failed to parse snapshot"));
    }
}
