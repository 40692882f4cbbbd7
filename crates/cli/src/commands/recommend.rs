use std::sync::Arc;

use shelfrec_core::{
    ApplicationError, ArtifactStore, RecommendationEngine, RecommendationRequest,
    RecommendationResponse,
};
use uuid::Uuid;

use crate::commands::{escape_json, load_config, CommandResult};

pub fn run(
    user_id: Option<&str>,
    item_id: Option<&str>,
    count: Option<usize>,
    json_output: bool,
) -> CommandResult {
    let config = match load_config("recommend") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let store = match ArtifactStore::load(&config.artifacts) {
        Ok(store) => store,
        Err(error) => {
            return CommandResult::failure("recommend", "artifact_load", error.to_string(), 3);
        }
    };

    let engine = RecommendationEngine::new(Arc::new(store), config.recommendation);
    let correlation_id = format!("cli-{}", Uuid::new_v4());
    let request = RecommendationRequest::new(user_id, item_id, count);

    match engine.recommend(request, &correlation_id) {
        Ok(response) if json_output => CommandResult {
            exit_code: 0,
            output: serde_json::to_string_pretty(&response).unwrap_or_else(|error| {
                format!(
                    "{{\"command\":\"recommend\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
                    escape_json(&error.to_string())
                )
            }),
        },
        Ok(response) => CommandResult { exit_code: 0, output: render_table(&response) },
        Err(error @ ApplicationError::InvalidRequest(_)) => {
            CommandResult::failure("recommend", "invalid_request", error.to_string(), 4)
        }
        Err(error) => CommandResult::failure("recommend", "recommendation", error.to_string(), 5),
    }
}

fn render_table(response: &RecommendationResponse) -> String {
    let headers = ["item_id", "title", "brand", "category", "price"];
    let rows: Vec<[&str; 5]> = response
        .items
        .iter()
        .map(|item| {
            [
                item.item_id.as_str(),
                item.title.as_str(),
                item.brand.as_str(),
                item.category.as_str(),
                item.price.as_str(),
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let render_row = |cells: &[&str; 5]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format!(
        "Top Recommendations (user: {}, item: {}, n: {})",
        response.user_id.as_deref().unwrap_or("anonymous"),
        response.item_id.as_deref().unwrap_or("none"),
        response.count
    )];
    if rows.is_empty() {
        lines.push("No recommendations available for this request.".to_string());
        return lines.join("\n");
    }

    lines.push(render_row(&headers));
    lines.extend(rows.iter().map(render_row));
    lines.push(String::new());
    lines.push("Why these?".to_string());
    lines.extend(response.items.iter().map(|item| format!("- {}: {}", item.item_id, item.reason)));

    lines.join("\n")
}
