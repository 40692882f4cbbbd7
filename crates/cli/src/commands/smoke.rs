use std::sync::Arc;
use std::time::Instant;

use crate::commands::{escape_json, CommandResult};
use serde::Serialize;
use shelfrec_core::config::{AppConfig, LoadOptions};
use shelfrec_core::{ArtifactStore, RecommendationEngine, RecommendationRequest};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum SmokeStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct SmokeCheck {
    name: &'static str,
    status: SmokeStatus,
    elapsed_ms: u64,
    message: String,
}

#[derive(Debug, Serialize)]
struct SmokeReport {
    command: &'static str,
    status: SmokeStatus,
    summary: String,
    total_elapsed_ms: u64,
    checks: Vec<SmokeCheck>,
}

pub fn run() -> CommandResult {
    let started = Instant::now();
    let mut checks = Vec::new();

    let config = match timed_check(|| AppConfig::load(LoadOptions::default())) {
        Ok((elapsed_ms, config)) => {
            checks.push(passed(
                "config_validation",
                elapsed_ms,
                "configuration loaded and validated",
            ));
            config
        }
        Err((elapsed_ms, error)) => {
            checks.push(failed("config_validation", elapsed_ms, error.to_string()));
            checks.push(skipped("artifact_load"));
            checks.push(skipped("recommendation"));
            return finalize_report(checks, elapsed_since(started));
        }
    };

    let store = match timed_check(|| ArtifactStore::load(&config.artifacts)) {
        Ok((elapsed_ms, store)) => {
            let summary = store.summary();
            checks.push(passed(
                "artifact_load",
                elapsed_ms,
                format!("{} users, {} items loaded", summary.users, summary.items),
            ));
            store
        }
        Err((elapsed_ms, error)) => {
            checks.push(failed("artifact_load", elapsed_ms, error.to_string()));
            checks.push(skipped("recommendation"));
            return finalize_report(checks, elapsed_since(started));
        }
    };

    let engine = RecommendationEngine::new(Arc::new(store), config.recommendation);
    let request = RecommendationRequest::new(None, None, None);
    match timed_check(|| engine.recommend(request, "smoke")) {
        Ok((elapsed_ms, response)) if !response.items.is_empty() => checks.push(passed(
            "recommendation",
            elapsed_ms,
            format!("anonymous request returned {} items", response.items.len()),
        )),
        Ok((elapsed_ms, _)) => checks.push(failed(
            "recommendation",
            elapsed_ms,
            "anonymous request returned no items; popularity artifact may be empty",
        )),
        Err((elapsed_ms, error)) => {
            checks.push(failed("recommendation", elapsed_ms, error.to_string()))
        }
    }

    finalize_report(checks, elapsed_since(started))
}

fn timed_check<T, E>(check: impl FnOnce() -> Result<T, E>) -> Result<(u64, T), (u64, E)> {
    let started = Instant::now();
    match check() {
        Ok(value) => Ok((elapsed_since(started), value)),
        Err(error) => Err((elapsed_since(started), error)),
    }
}

fn elapsed_since(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

fn passed(name: &'static str, elapsed_ms: u64, message: impl Into<String>) -> SmokeCheck {
    SmokeCheck { name, status: SmokeStatus::Pass, elapsed_ms, message: message.into() }
}

fn failed(name: &'static str, elapsed_ms: u64, message: impl Into<String>) -> SmokeCheck {
    SmokeCheck { name, status: SmokeStatus::Fail, elapsed_ms, message: message.into() }
}

fn skipped(name: &'static str) -> SmokeCheck {
    SmokeCheck {
        name,
        status: SmokeStatus::Skipped,
        elapsed_ms: 0,
        message: "skipped due previous failure".to_string(),
    }
}

fn finalize_report(checks: Vec<SmokeCheck>, total_elapsed_ms: u64) -> CommandResult {
    let passed = checks.iter().filter(|check| check.status == SmokeStatus::Pass).count();
    let total = checks.len();
    let failed = checks.iter().any(|check| check.status == SmokeStatus::Fail);

    let report = SmokeReport {
        command: "smoke",
        status: if failed { SmokeStatus::Fail } else { SmokeStatus::Pass },
        summary: format!("smoke: {passed}/{total} checks passed in {total_elapsed_ms}ms"),
        total_elapsed_ms,
        checks,
    };

    let human = report.summary.clone();
    let machine = serde_json::to_string(&report).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"smoke\",\"status\":\"fail\",\"summary\":\"serialization failed\",\"error\":\"{}\"}}",
            escape_json(&error.to_string())
        )
    });

    CommandResult { exit_code: if failed { 6 } else { 0 }, output: format!("{human}\n{machine}") }
}
