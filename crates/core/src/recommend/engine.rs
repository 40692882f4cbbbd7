use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::filter::{allowed_categories, filter, CategoryScope};
use super::generators::{popular, settle, try_co_viewed, try_personalized};
use super::merge::{attribute, merge, CandidateGroups, Source};
use super::resolver::resolve;
use crate::artifacts::ArtifactStore;
use crate::config::RecommendationConfig;
use crate::errors::ApplicationError;

/// Inputs collected by the UI form or the CLI.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecommendationRequest {
    pub user_id: Option<String>,
    pub item_id: Option<String>,
    pub count: Option<usize>,
    pub show_images: bool,
}

impl RecommendationRequest {
    pub fn new(user_id: Option<&str>, item_id: Option<&str>, count: Option<usize>) -> Self {
        Self {
            user_id: user_id.map(str::to_string),
            item_id: item_id.map(str::to_string),
            count,
            show_images: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecommendedItem {
    pub item_id: String,
    pub title: String,
    pub brand: String,
    pub category: String,
    pub price: String,
    pub image_url: Option<String>,
    pub reason: Source,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CandidateCounts {
    pub generated: usize,
    pub kept: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub scope: CategoryScope,
    pub personalized: CandidateCounts,
    pub co_viewed: CandidateCounts,
    pub popular: CandidateCounts,
    pub backfilled: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecommendationResponse {
    pub correlation_id: String,
    pub user_id: Option<String>,
    pub item_id: Option<String>,
    pub count: usize,
    pub show_images: bool,
    pub items: Vec<RecommendedItem>,
    pub diagnostics: Diagnostics,
}

/// Runs the full generate, filter, merge and enrich pipeline against one
/// immutable artifact store shared by every request.
#[derive(Clone, Debug)]
pub struct RecommendationEngine {
    store: Arc<ArtifactStore>,
    settings: RecommendationConfig,
}

impl RecommendationEngine {
    pub fn new(store: Arc<ArtifactStore>, settings: RecommendationConfig) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn settings(&self) -> &RecommendationConfig {
        &self.settings
    }

    pub fn recommend(
        &self,
        request: RecommendationRequest,
        correlation_id: &str,
    ) -> Result<RecommendationResponse, ApplicationError> {
        let count = request.count.unwrap_or(self.settings.default_count);
        if count == 0 || count > self.settings.max_count {
            return Err(ApplicationError::InvalidRequest(format!(
                "number of recommendations must be between 1 and {}, got {count}",
                self.settings.max_count
            )));
        }
        let user_id = present(request.user_id);
        let item_id = present(request.item_id);
        let store = self.store.as_ref();

        let scope = allowed_categories(store, item_id.as_deref());
        let fetch = count.saturating_mul(self.settings.candidate_multiplier);

        let personalized_raw = match user_id.as_deref() {
            Some(user) => settle(
                "personalized",
                user,
                correlation_id,
                try_personalized(store, user, fetch),
            ),
            None => Vec::new(),
        };
        let co_viewed_raw = match item_id.as_deref() {
            Some(item) => {
                settle("co_view", item, correlation_id, try_co_viewed(store, item, fetch))
            }
            None => Vec::new(),
        };
        let popular_unfiltered =
            popular(store, count.saturating_mul(self.settings.popular_multiplier));

        let groups = CandidateGroups {
            personalized: filter(store, personalized_raw.clone(), &scope),
            co_viewed: filter(store, co_viewed_raw.clone(), &scope),
            popular: filter(store, popular_unfiltered.clone(), &scope),
            popular_unfiltered,
        };

        let merged = merge(&groups, count);
        let reasons = attribute(&groups, &merged);
        let backfilled = merged
            .iter()
            .filter(|item| {
                !groups.personalized.contains(item)
                    && !groups.co_viewed.contains(item)
                    && !groups.popular.contains(item)
            })
            .count();

        let items: Vec<RecommendedItem> = merged
            .into_iter()
            .zip(reasons)
            .map(|(item_id, reason)| {
                let metadata = resolve(store, &item_id);
                RecommendedItem {
                    item_id,
                    title: metadata.title,
                    brand: metadata.brand,
                    category: metadata.category_id,
                    price: metadata.price,
                    image_url: metadata.image_url,
                    reason,
                }
            })
            .collect();

        let diagnostics = Diagnostics {
            personalized: CandidateCounts {
                generated: personalized_raw.len(),
                kept: groups.personalized.len(),
            },
            co_viewed: CandidateCounts {
                generated: co_viewed_raw.len(),
                kept: groups.co_viewed.len(),
            },
            popular: CandidateCounts {
                generated: groups.popular_unfiltered.len(),
                kept: groups.popular.len(),
            },
            backfilled,
            scope,
        };

        info!(
            event_name = "recommend.request.completed",
            correlation_id,
            user_id = user_id.as_deref().unwrap_or(""),
            item_id = item_id.as_deref().unwrap_or(""),
            requested = count,
            returned = items.len(),
            backfilled,
            "recommendations generated"
        );

        Ok(RecommendationResponse {
            correlation_id: correlation_id.to_string(),
            user_id,
            item_id,
            count,
            show_images: request.show_images,
            items,
            diagnostics,
        })
    }
}

/// Blank form fields count as absent. Anything else is looked up verbatim.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
