//! Demo web UI and JSON API for recommendations.
//!
//! HTML Endpoints:
//! - `GET /`                        request form
//! - `GET /recommendations`         form plus results table and attributions
//!
//! JSON API Endpoints:
//! - `GET /api/v1/recommendations`  same pipeline, JSON response

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shelfrec_core::{
    ApplicationError, InterfaceError, RecommendationEngine, RecommendationRequest,
    RecommendationResponse,
};
use tera::{Context, Tera};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct UiState {
    engine: Arc<RecommendationEngine>,
    templates: Arc<Tera>,
}

/// Raw form fields. Everything arrives as text so bad input becomes a
/// rendered 400 instead of an extractor rejection.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RecommendationQuery {
    pub user_id: Option<String>,
    pub item_id: Option<String>,
    pub n: Option<String>,
    pub show_images: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub detail: String,
    pub correlation_id: String,
}

impl RecommendationQuery {
    fn to_request(&self, max_count: usize) -> Result<RecommendationRequest, ApplicationError> {
        let count = match self.n.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<usize>().map_err(|_| {
                ApplicationError::InvalidRequest(format!(
                    "number of recommendations must be a whole number between 1 and {max_count}, got `{raw}`"
                ))
            })?),
        };

        Ok(RecommendationRequest {
            user_id: self.user_id.clone(),
            item_id: self.item_id.clone(),
            count,
            show_images: self.show_images.as_deref().is_some_and(is_checked),
        })
    }
}

fn is_checked(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "on" | "true" | "1" | "yes")
}

fn init_templates() -> Arc<Tera> {
    let mut tera = match Tera::new("templates/ui/**/*") {
        Ok(t) => t,
        Err(e) => {
            warn!(error = %e, "failed to load ui templates from filesystem, using embedded copy");
            Tera::default()
        }
    };

    if tera.get_template_names().all(|name| name != "index.html") {
        tera.add_raw_template("index.html", include_str!("../../../templates/ui/index.html"))
            .ok();
    }

    Arc::new(tera)
}

pub fn router(engine: Arc<RecommendationEngine>) -> Router {
    let templates = init_templates();

    Router::new()
        .route("/", get(index_page))
        .route("/recommendations", get(recommendations_page))
        .route("/api/v1/recommendations", get(recommendations_api))
        .with_state(UiState { engine, templates })
}

// ---------------------------------------------------------------------------
// HTML Handlers
// ---------------------------------------------------------------------------

async fn index_page(
    State(state): State<UiState>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let form = RecommendationQuery {
        n: Some(state.engine.settings().default_count.to_string()),
        ..RecommendationQuery::default()
    };
    render_page(&state, &form, None, None).map(Html)
}

async fn recommendations_page(
    Query(query): Query<RecommendationQuery>,
    State(state): State<UiState>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let correlation_id = Uuid::new_v4().to_string();

    match run(&state, &query, &correlation_id) {
        Ok(response) => render_page(&state, &query, Some(&response), None).map(Html),
        Err(error) => {
            let status = status_for(&error);
            let html = render_page(&state, &query, None, Some(&error))?;
            Err((status, Html(html)))
        }
    }
}

fn render_page(
    state: &UiState,
    form: &RecommendationQuery,
    results: Option<&RecommendationResponse>,
    error: Option<&InterfaceError>,
) -> Result<String, (StatusCode, Html<String>)> {
    let store = state.engine.store();
    let mut context = Context::new();

    context.insert(
        "form",
        &serde_json::json!({
            "user_id": form.user_id.as_deref().unwrap_or_default(),
            "item_id": form.item_id.as_deref().unwrap_or_default(),
            "n": form.n.as_deref().unwrap_or_default(),
        }),
    );
    context.insert("form_show_images", &form.show_images.as_deref().is_some_and(is_checked));
    context.insert("max_count", &state.engine.settings().max_count);
    context.insert(
        "hints",
        &serde_json::json!({
            "users": store.users.classes().iter().take(3).collect::<Vec<_>>(),
            "items": store.items.classes().iter().take(3).collect::<Vec<_>>(),
        }),
    );
    context.insert("results", &results);
    context.insert(
        "error",
        &error.map(|error| {
            serde_json::json!({
                "message": error.user_message(),
                "detail": error.to_string(),
                "correlation_id": error.correlation_id(),
            })
        }),
    );

    state.templates.render("index.html", &context).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("<h1>Template Error</h1><pre>{:?}</pre>", e)),
        )
    })
}

// ---------------------------------------------------------------------------
// JSON API Handlers
// ---------------------------------------------------------------------------

async fn recommendations_api(
    Query(query): Query<RecommendationQuery>,
    State(state): State<UiState>,
) -> Result<Json<RecommendationResponse>, (StatusCode, Json<ApiError>)> {
    let correlation_id = Uuid::new_v4().to_string();

    run(&state, &query, &correlation_id).map(Json).map_err(|error| {
        (
            status_for(&error),
            Json(ApiError {
                error: error.user_message().to_string(),
                detail: error.to_string(),
                correlation_id: error.correlation_id().to_string(),
            }),
        )
    })
}

fn run(
    state: &UiState,
    query: &RecommendationQuery,
    correlation_id: &str,
) -> Result<RecommendationResponse, InterfaceError> {
    let outcome = query
        .to_request(state.engine.settings().max_count)
        .and_then(|request| state.engine.recommend(request, correlation_id));

    match outcome {
        Ok(response) => {
            info!(
                event_name = "ui.recommendations.served",
                correlation_id,
                returned = response.items.len(),
                "recommendations served"
            );
            Ok(response)
        }
        Err(error) => {
            warn!(
                event_name = "ui.recommendations.rejected",
                correlation_id,
                error = %error,
                "recommendation request rejected"
            );
            Err(error.into_interface(correlation_id))
        }
    }
}

fn status_for(error: &InterfaceError) -> StatusCode {
    match error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
