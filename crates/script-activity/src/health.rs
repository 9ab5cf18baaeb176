//! Health reporting
//!
//! Read-only diagnostics an external health-check collaborator queries:
//! whether the configured engine name resolves at all (no engine is
//! allocated for the answer) and whether the declared local dependency
//! files are present in the host's designated library directory.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use script_engine::EngineRegistry;
use serde::Serialize;
use serde_json::{json, Value};

use crate::activity::ScriptActivity;

/// Severity of a health report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Ok,
    Warning,
    Severe,
}

/// A severity-leveled diagnostic report with structured detail fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Human-readable summary
    pub label: String,
    /// Severity; an aggregate report carries the worst of its subreports
    pub status: HealthStatus,
    /// Structured details (e.g. missing dependency names)
    pub properties: HashMap<String, Value>,
    /// Nested reports
    pub subreports: Vec<HealthReport>,
}

impl HealthReport {
    /// Create a leaf report.
    pub fn new(label: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            label: label.into(),
            status,
            properties: HashMap::new(),
            subreports: Vec::new(),
        }
    }

    /// Attach a structured detail field.
    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Create an aggregate report whose status is the worst of its
    /// subreports (Ok when there are none).
    pub fn aggregate(label: impl Into<String>, subreports: Vec<HealthReport>) -> Self {
        let status = Self::worst_status(&subreports);
        Self {
            label: label.into(),
            status,
            properties: HashMap::new(),
            subreports,
        }
    }

    /// Worst status across a set of reports; Ok for an empty set.
    pub fn worst_status(reports: &[HealthReport]) -> HealthStatus {
        reports
            .iter()
            .map(|report| report.status)
            .max()
            .unwrap_or(HealthStatus::Ok)
    }
}

/// Read-only health queries over a configured activity.
pub trait HealthCheckable {
    /// Produce the aggregate health report, checking dependencies against
    /// the given library directory.
    fn check_health(&self, lib_dir: &Path) -> HealthReport;
}

impl HealthCheckable for ScriptActivity {
    fn check_health(&self, lib_dir: &Path) -> HealthReport {
        self.check_health_against(EngineRegistry::global(), lib_dir)
    }
}

impl ScriptActivity {
    /// Health check against an explicit registry; the trait method uses
    /// the process-wide one.
    pub fn check_health_against(
        &self,
        registry: &EngineRegistry,
        lib_dir: &Path,
    ) -> HealthReport {
        let config = self.configuration();
        let mut reports = Vec::new();

        if !registry.is_resolvable(&config.engine_name) {
            reports.push(HealthReport::new(
                "Unknown script language",
                HealthStatus::Severe,
            ));
        }

        if !config.local_dependencies.is_empty() {
            let present = list_file_names(lib_dir);
            let missing: Vec<&String> = config
                .local_dependencies
                .iter()
                .filter(|name| !present.contains(name.as_str()))
                .collect();

            if missing.is_empty() {
                reports.push(HealthReport::new(
                    "Script dependencies found",
                    HealthStatus::Ok,
                ));
            } else {
                reports.push(
                    HealthReport::new("Script dependencies missing", HealthStatus::Severe)
                        .with_property("dependencies", json!(missing))
                        .with_property("directory", json!(lib_dir.display().to_string())),
                );
            }
        }

        HealthReport::aggregate("Script activity report", reports)
    }
}

fn list_file_names(dir: &Path) -> HashSet<String> {
    let mut names = HashSet::new();
    match std::fs::read_dir(dir) {
        Ok(entries) => {
            for entry in entries.flatten() {
                names.insert(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Err(error) => {
            log::warn!(
                "unable to list library directory {}: {error}",
                dir.display()
            );
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScriptActivityConfig;

    fn activity(engine_name: &str, dependencies: &[&str]) -> ScriptActivity {
        let mut config = ScriptActivityConfig::new(engine_name, "");
        config.local_dependencies = dependencies.iter().map(|s| s.to_string()).collect();
        ScriptActivity::configure(config).unwrap()
    }

    #[test]
    fn test_unknown_engine_is_severe() {
        let dir = tempfile::tempdir().unwrap();
        let report = activity("Fortran", &[]).check_health(dir.path());

        assert_eq!(report.status, HealthStatus::Severe);
        assert_eq!(report.subreports.len(), 1);
        assert_eq!(report.subreports[0].label, "Unknown script language");
    }

    #[test]
    fn test_resolvable_engine_with_no_dependencies_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let report = activity("Rhai", &[]).check_health(dir.path());

        assert_eq!(report.status, HealthStatus::Ok);
        assert!(report.subreports.is_empty());
    }

    #[test]
    fn test_dependencies_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("helper.jar"), b"jar").unwrap();

        let report = activity("Rhai", &["helper.jar"]).check_health(dir.path());
        assert_eq!(report.status, HealthStatus::Ok);
        assert_eq!(report.subreports[0].label, "Script dependencies found");
    }

    #[test]
    fn test_missing_dependency_is_severe_with_details() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("present.jar"), b"jar").unwrap();

        let report =
            activity("Rhai", &["present.jar", "absent.jar"]).check_health(dir.path());

        assert_eq!(report.status, HealthStatus::Severe);
        let missing = &report.subreports[0];
        assert_eq!(missing.label, "Script dependencies missing");
        assert_eq!(missing.properties["dependencies"], json!(["absent.jar"]));
        assert_eq!(
            missing.properties["directory"],
            json!(dir.path().display().to_string())
        );
    }

    #[test]
    fn test_worst_status_aggregation() {
        let reports = vec![
            HealthReport::new("fine", HealthStatus::Ok),
            HealthReport::new("meh", HealthStatus::Warning),
        ];
        assert_eq!(HealthReport::worst_status(&reports), HealthStatus::Warning);
        assert_eq!(HealthReport::worst_status(&[]), HealthStatus::Ok);

        let aggregate = HealthReport::aggregate("root", reports);
        assert_eq!(aggregate.status, HealthStatus::Warning);
    }

    #[test]
    fn test_report_serializes_with_camel_case_fields() {
        let report = HealthReport::new("fine", HealthStatus::Ok)
            .with_property("directory", json!("/tmp/lib"));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], json!("ok"));
        assert_eq!(value["properties"]["directory"], json!("/tmp/lib"));
    }
}
