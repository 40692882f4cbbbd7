use std::collections::BTreeSet;

use serde::Serialize;

use super::resolver::resolve;
use crate::artifacts::ArtifactStore;

/// Categories a candidate may belong to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "categories", rename_all = "snake_case")]
pub enum CategoryScope {
    Unrestricted,
    Only(BTreeSet<String>),
}

impl CategoryScope {
    pub fn allows(&self, category: Option<&str>) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Only(allowed) => category.is_some_and(|category| allowed.contains(category)),
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }

    pub fn categories(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::Unrestricted => None,
            Self::Only(allowed) => Some(allowed),
        }
    }
}

/// The reference item's own category plus every category related to it.
/// No reference item, or one without a category, means no restriction.
pub fn allowed_categories(store: &ArtifactStore, item_id: Option<&str>) -> CategoryScope {
    let Some(item_id) = item_id else {
        return CategoryScope::Unrestricted;
    };
    let metadata = resolve(store, item_id);
    let Some(category) = metadata.category() else {
        return CategoryScope::Unrestricted;
    };

    let mut allowed = BTreeSet::from([category.to_string()]);
    if let Some(related) = store.categories.related_to(category) {
        allowed.extend(related.iter().cloned());
    }
    CategoryScope::Only(allowed)
}

/// Stable filter: survivors keep their relative order.
pub fn filter_candidates<F>(
    candidates: Vec<String>,
    scope: &CategoryScope,
    category_of: F,
) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    if scope.is_unrestricted() {
        return candidates;
    }
    candidates
        .into_iter()
        .filter(|item_id| scope.allows(category_of(item_id).as_deref()))
        .collect()
}

pub fn filter(
    store: &ArtifactStore,
    candidates: Vec<String>,
    scope: &CategoryScope,
) -> Vec<String> {
    filter_candidates(candidates, scope, |item_id| {
        resolve(store, item_id).category().map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{allowed_categories, filter, filter_candidates, CategoryScope};
    use crate::recommend::test_support::small_store;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn scope(categories: &[&str]) -> CategoryScope {
        CategoryScope::Only(categories.iter().map(|category| category.to_string()).collect())
    }

    #[test]
    fn unrestricted_scope_is_identity() {
        let candidates = ids(&["p9", "p1", "p9", "unknown"]);
        let filtered =
            filter_candidates(candidates.clone(), &CategoryScope::Unrestricted, |_| None);
        assert_eq!(filtered, candidates);
    }

    #[test]
    fn filtering_preserves_relative_order() {
        let store = small_store();
        let candidates = ids(&["p3", "p2", "p1", "p4", "p0"]);
        let filtered = filter(&store, candidates, &scope(&["shoes", "socks"]));
        assert_eq!(filtered, ids(&["p3", "p1", "p0"]));
    }

    #[test]
    fn items_without_category_never_pass_a_restricted_scope() {
        let filtered = filter_candidates(ids(&["a", "b"]), &scope(&["shoes"]), |id| {
            (id == "b").then(|| "shoes".to_string())
        });
        assert_eq!(filtered, ids(&["b"]));
    }

    #[test]
    fn allowed_categories_include_related_ones() {
        let store = small_store();

        assert_eq!(allowed_categories(&store, Some("p0")), scope(&["shoes", "socks"]));
        // hats has no relationships entry
        assert_eq!(allowed_categories(&store, Some("p4")), scope(&["hats"]));
    }

    #[test]
    fn missing_reference_item_means_no_restriction() {
        let store = small_store();

        assert_eq!(allowed_categories(&store, None), CategoryScope::Unrestricted);
        assert_eq!(allowed_categories(&store, Some("unknown")), CategoryScope::Unrestricted);
        assert_eq!(CategoryScope::Unrestricted.categories(), None);
        assert_eq!(scope(&["hats"]).categories(), Some(&BTreeSet::from(["hats".to_string()])));
    }
}
