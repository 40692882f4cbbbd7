use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use shelfrec_core::{ArtifactSummary, RecommendationEngine};
use tracing::info;

#[derive(Clone)]
pub struct HealthState {
    engine: Arc<RecommendationEngine>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub co_view: HealthCheck,
    pub popularity: HealthCheck,
    pub category_relationships: HealthCheck,
    pub artifacts: ArtifactSummary,
    pub checked_at: String,
}

pub fn router(engine: Arc<RecommendationEngine>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { engine })
}

/// Always 200 once serving: optional artifacts only degrade quality.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let summary = state.engine.store().summary();
    let co_view = optional_check(summary.co_view_entries, "co-view entries");
    let popularity = optional_check(summary.popular_items, "popular items");
    let category_relationships =
        optional_check(summary.category_relationships, "category relationships");
    let degraded = [&co_view, &popularity, &category_relationships]
        .iter()
        .any(|check| check.status != "ready");

    let payload = HealthResponse {
        status: if degraded { "degraded" } else { "ready" },
        service: HealthCheck {
            status: "ready",
            detail: format!(
                "serving {} items for {} known users",
                summary.items, summary.users
            ),
        },
        co_view,
        popularity,
        category_relationships,
        artifacts: summary,
        checked_at: Utc::now().to_rfc3339(),
    };

    info!(
        event_name = "system.health.checked",
        correlation_id = "health",
        status = payload.status,
        "health check served"
    );
    (StatusCode::OK, Json(payload))
}

fn optional_check(entries: usize, label: &str) -> HealthCheck {
    if entries == 0 {
        HealthCheck { status: "degraded", detail: format!("no {label} loaded") }
    } else {
        HealthCheck { status: "ready", detail: format!("{entries} {label} loaded") }
    }
}
