use serde::Serialize;
use shelfrec_core::config::{AppConfig, LoadOptions};
use shelfrec_core::ArtifactStore;

use crate::commands::{escape_json, CommandResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

impl DoctorCheck {
    fn new(name: impl Into<String>, status: CheckStatus, details: impl Into<String>) -> Self {
        Self { name: name.into(), status, details: details.into() }
    }
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck::new(
                "config_validation",
                CheckStatus::Pass,
                "configuration loaded and validated",
            ));
            let required_present = check_artifact_files(&config, &mut checks);
            checks.push(check_artifact_load(&config, required_present));
        }
        Err(error) => {
            checks.push(DoctorCheck::new(
                "config_validation",
                CheckStatus::Fail,
                error.to_string(),
            ));
            checks.push(DoctorCheck::new(
                "artifact_load",
                CheckStatus::Skipped,
                "skipped because configuration did not load",
            ));
        }
    }

    // optional artifacts may be skipped without failing the run
    let failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if failed { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if failed {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

/// One check per configured artifact file. Returns whether every required file exists.
fn check_artifact_files(config: &AppConfig, checks: &mut Vec<DoctorCheck>) -> bool {
    let mut required_present = true;

    for (label, file_name, required) in config.artifacts.manifest() {
        let path = config.artifacts.path_of(file_name);
        let name = format!("artifact:{label}");
        let check = match (path.metadata(), required) {
            (Ok(metadata), _) => DoctorCheck::new(
                name,
                CheckStatus::Pass,
                format!("found `{}` ({} bytes)", path.display(), metadata.len()),
            ),
            (Err(_), true) => {
                required_present = false;
                DoctorCheck::new(
                    name,
                    CheckStatus::Fail,
                    format!("required artifact missing at `{}`", path.display()),
                )
            }
            (Err(_), false) => DoctorCheck::new(
                name,
                CheckStatus::Skipped,
                format!("optional artifact not present at `{}`", path.display()),
            ),
        };
        checks.push(check);
    }

    required_present
}

fn check_artifact_load(config: &AppConfig, required_present: bool) -> DoctorCheck {
    if !required_present {
        return DoctorCheck::new(
            "artifact_load",
            CheckStatus::Skipped,
            "skipped because required artifacts are missing",
        );
    }

    match ArtifactStore::load(&config.artifacts) {
        Ok(store) => {
            let summary = store.summary();
            DoctorCheck::new(
                "artifact_load",
                CheckStatus::Pass,
                format!(
                    "{} users, {} items, {} interactions, {} co-view entries, {} popular items",
                    summary.users,
                    summary.items,
                    summary.interactions,
                    summary.co_view_entries,
                    summary.popular_items
                ),
            )
        }
        Err(error) => DoctorCheck::new("artifact_load", CheckStatus::Fail, error.to_string()),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
