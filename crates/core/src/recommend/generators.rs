use tracing::{debug, warn};

use crate::artifacts::ArtifactStore;
use crate::errors::{GeneratorError, LookupMiss};

/// Top-`count` model picks for `user_id`. Unknown users get nothing.
pub fn personalized(store: &ArtifactStore, user_id: &str, count: usize) -> Vec<String> {
    settle("personalized", user_id, "unassigned", try_personalized(store, user_id, count))
}

pub fn try_personalized(
    store: &ArtifactStore,
    user_id: &str,
    count: usize,
) -> Result<Vec<String>, GeneratorError> {
    let user = store
        .users
        .encode(user_id)
        .ok_or_else(|| LookupMiss::UnknownUser(user_id.to_string()))?;

    store
        .model
        .recommend(user as usize, &store.interactions, count)?
        .into_iter()
        .map(|item| decode(store, item.code))
        .collect()
}

/// First `count` items viewed together with `item_id`, in stored order.
pub fn co_viewed(store: &ArtifactStore, item_id: &str, count: usize) -> Vec<String> {
    settle("co_view", item_id, "unassigned", try_co_viewed(store, item_id, count))
}

pub fn try_co_viewed(
    store: &ArtifactStore,
    item_id: &str,
    count: usize,
) -> Result<Vec<String>, GeneratorError> {
    let code = store
        .items
        .encode(item_id)
        .ok_or_else(|| LookupMiss::UnknownItem(item_id.to_string()))?;

    store
        .co_view
        .related(code)
        .unwrap_or_default()
        .iter()
        .take(count)
        .map(|code| decode(store, *code))
        .collect()
}

/// Globally most popular items. Empty when no popularity list was loaded.
pub fn popular(store: &ArtifactStore, count: usize) -> Vec<String> {
    store
        .popular
        .top(count)
        .iter()
        .filter_map(|code| store.items.decode(*code).map(str::to_string))
        .collect()
}

fn decode(store: &ArtifactStore, code: u32) -> Result<String, GeneratorError> {
    store
        .items
        .decode(code)
        .map(str::to_string)
        .ok_or(GeneratorError::Lookup(LookupMiss::UnknownCode(code)))
}

/// Collapses a generator outcome to the public contract: a list, possibly empty.
pub(crate) fn settle(
    source: &'static str,
    subject: &str,
    correlation_id: &str,
    outcome: Result<Vec<String>, GeneratorError>,
) -> Vec<String> {
    match outcome {
        Ok(items) => items,
        Err(error) if error.is_lookup_miss() => {
            debug!(
                event_name = "recommend.generator.miss",
                correlation_id,
                source,
                subject,
                reason = %error,
                "candidate source has nothing for this input"
            );
            Vec::new()
        }
        Err(error) => {
            warn!(
                event_name = "recommend.generator.failed",
                correlation_id,
                source,
                subject,
                error = %error,
                "candidate source failed, continuing without it"
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{co_viewed, personalized, popular, try_co_viewed, try_personalized};
    use crate::errors::{GeneratorError, LookupMiss};
    use crate::recommend::test_support::{small_store, store_with_short_model};

    #[test]
    fn unknown_users_get_no_personalized_candidates() {
        let store = small_store();

        assert!(personalized(&store, "ghost", 5).is_empty());
        assert!(personalized(&store, "", 5).is_empty());
        assert_eq!(
            try_personalized(&store, "ghost", 5),
            Err(GeneratorError::Lookup(LookupMiss::UnknownUser("ghost".to_string())))
        );
    }

    #[test]
    fn personalized_ranks_unconsumed_items_by_affinity() {
        let store = small_store();

        // p0 scores highest for u0 but was already consumed
        assert_eq!(personalized(&store, "u0", 3), vec!["p3", "p2", "p1"]);
        assert_eq!(personalized(&store, "u1", 2), vec!["p2", "p4"]);
    }

    #[test]
    fn model_faults_surface_from_try_and_collapse_to_empty() {
        let store = store_with_short_model();

        let outcome = try_personalized(&store, "u2", 3);
        assert!(outcome.is_err_and(|error| !error.is_lookup_miss()));
        assert!(personalized(&store, "u2", 3).is_empty());
        assert_eq!(personalized(&store, "u0", 3), vec!["p3", "p2", "p1"]);
    }

    #[test]
    fn co_view_keeps_stored_order_and_truncates() {
        let store = small_store();

        assert_eq!(co_viewed(&store, "p0", 2), vec!["p2", "p1"]);
        assert_eq!(co_viewed(&store, "p0", 10), vec!["p2", "p1", "p4"]);
        assert!(co_viewed(&store, "p3", 4).is_empty());
    }

    #[test]
    fn co_view_distinguishes_unknown_items_from_missing_entries() {
        let store = small_store();

        assert_eq!(try_co_viewed(&store, "p2", 3), Ok(Vec::new()));
        assert!(try_co_viewed(&store, "zzz", 3).is_err_and(|error| error.is_lookup_miss()));
        assert!(co_viewed(&store, "zzz", 3).is_empty());
    }

    #[test]
    fn popularity_follows_global_ranking() {
        let store = small_store();

        assert_eq!(popular(&store, 3), vec!["p4", "p2", "p0"]);
        assert_eq!(popular(&store, 50).len(), 5);
    }

    #[test]
    fn generators_never_exceed_count() {
        let store = small_store();

        for count in 0..8 {
            assert!(personalized(&store, "u0", count).len() <= count);
            assert!(co_viewed(&store, "p0", count).len() <= count);
            assert!(popular(&store, count).len() <= count);
        }
    }
}
