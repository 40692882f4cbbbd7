use std::sync::Arc;

use shelfrec_core::config::{ArtifactsConfig, RecommendationConfig};
use shelfrec_core::recommend::{personalized, CategoryScope};
use shelfrec_core::{
    ArtifactStore, DemoArtifacts, RecommendationEngine, RecommendationRequest, Source,
};
use tempfile::TempDir;

fn seeded_engine() -> (TempDir, RecommendationEngine) {
    let dir = TempDir::new().expect("temp dir");
    let config = ArtifactsConfig::with_dir(dir.path());
    DemoArtifacts.write_to(&config, false).expect("seed demo artifacts");

    let store = ArtifactStore::load(&config).expect("load seeded artifacts");
    (dir, RecommendationEngine::new(Arc::new(store), RecommendationConfig::default()))
}

fn ids(response: &shelfrec_core::RecommendationResponse) -> Vec<&str> {
    response.items.iter().map(|item| item.item_id.as_str()).collect()
}

#[test]
fn known_user_and_item_blend_all_three_sources() {
    let (_dir, engine) = seeded_engine();
    let response = engine
        .recommend(RecommendationRequest::new(Some("u1"), Some("p1000"), Some(6)), "it-1")
        .expect("valid request");

    assert_eq!(ids(&response), vec!["p1001", "p1003", "p1008", "p1009", "p1002", "p1000"]);
    let reasons: Vec<Source> = response.items.iter().map(|item| item.reason).collect();
    assert_eq!(
        reasons,
        vec![
            Source::Personalized,
            Source::Personalized,
            Source::Personalized,
            Source::Personalized,
            Source::CoView,
            Source::Popular,
        ]
    );

    let allowed = response.diagnostics.scope.categories().expect("restricted scope");
    assert!(allowed.contains("shoes") && allowed.contains("socks") && allowed.contains("packs"));
}

#[test]
fn consumed_items_never_come_back_as_personalized() {
    let (_dir, engine) = seeded_engine();
    let picks = personalized(engine.store(), "u1", 20);

    assert_eq!(picks.len(), 10);
    assert!(!picks.iter().any(|item| item == "p1000" || item == "p1002"));
}

#[test]
fn category_comes_from_item_id_index_when_code_row_is_missing() {
    let (_dir, engine) = seeded_engine();
    let response = engine
        .recommend(RecommendationRequest::new(None, Some("p1011"), Some(4)), "it-2")
        .expect("valid request");

    assert_eq!(ids(&response), vec!["p1009", "p1010", "p1008", "p1011"]);
    assert!(response.items.iter().all(|item| item.reason == Source::Popular));
    assert_eq!(response.items[3].title, "Camp Lantern");
}

#[test]
fn narrow_categories_are_backfilled_up_to_the_full_count() {
    let (_dir, engine) = seeded_engine();
    let response = engine
        .recommend(RecommendationRequest::new(None, Some("p1006"), Some(20)), "it-3")
        .expect("valid request");

    assert_eq!(response.items.len(), 12);
    assert_eq!(&ids(&response)[..4], &["p1004", "p1005", "p1006", "p1007"]);
    assert_eq!(response.diagnostics.backfilled, 8);
}

#[test]
fn cold_start_without_context_is_popularity_only() {
    let (_dir, engine) = seeded_engine();
    let response = engine
        .recommend(RecommendationRequest::new(Some("new-user"), None, Some(3)), "it-4")
        .expect("valid request");

    assert_eq!(response.diagnostics.scope, CategoryScope::Unrestricted);
    assert_eq!(ids(&response), vec!["p1000", "p1004", "p1009"]);
}
