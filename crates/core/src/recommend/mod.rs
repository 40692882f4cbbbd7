//! Recommendation pipeline
//!
//! Three candidate sources (personalized ALS, co-view, popularity) are
//! narrowed to the categories related to the current item, merged under a
//! fixed priority order, and backfilled from unfiltered popularity when the
//! filtered sources cannot fill the quota.

mod engine;
mod filter;
mod generators;
mod merge;
mod resolver;

pub use engine::{
    CandidateCounts, Diagnostics, RecommendationEngine, RecommendationRequest,
    RecommendationResponse, RecommendedItem,
};
pub use filter::{allowed_categories, filter, filter_candidates, CategoryScope};
pub use generators::{
    co_viewed, personalized, popular, try_co_viewed, try_personalized,
};
pub use merge::{attribute, merge, CandidateGroups, Source};
pub use resolver::{resolve, try_resolve};

/// Results shown when the caller does not ask for a specific count
pub const DEFAULT_COUNT: usize = 6;

/// Upper bound for a single request
pub const MAX_COUNT: usize = 20;

/// Over-fetch factor for personalized and co-view candidates
pub const CANDIDATE_MULTIPLIER: usize = 4;

/// Over-fetch factor for popularity candidates
pub const POPULAR_MULTIPLIER: usize = 6;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::artifacts::{
        ArtifactStore, CategoryRelationships, CoViewMap, CsrMatrix, FactorModel, LabelEncoder,
        PopularityList, ProductCatalog,
    };

    fn encoder(labels: &[&str]) -> LabelEncoder {
        LabelEncoder::from_classes(labels.iter().map(|label| label.to_string()).collect())
            .expect("unique labels")
    }

    /// Store with no model data, only an item encoder and a metadata table.
    pub(crate) fn store_with_catalog(items: &[&str], catalog_csv: &str) -> ArtifactStore {
        ArtifactStore {
            users: LabelEncoder::default(),
            items: encoder(items),
            model: FactorModel::new(Vec::new(), Vec::new()).expect("empty model"),
            interactions: CsrMatrix::from_triplets((0, 0), &[]).expect("empty matrix"),
            co_view: CoViewMap::default(),
            popular: PopularityList::default(),
            catalog: ProductCatalog::from_reader(catalog_csv.as_bytes()).expect("valid csv"),
            categories: CategoryRelationships::default(),
        }
    }

    /// Two users, five items across three categories.
    ///
    /// u0 prefers p0/p3 (already consumed p0); u1 prefers p1 (already consumed p1).
    pub(crate) fn small_store() -> ArtifactStore {
        let mut categories = CategoryRelationships::default();
        categories.insert("shoes", "socks");
        categories.insert("socks", "shoes");

        ArtifactStore {
            users: encoder(&["u0", "u1"]),
            items: encoder(&["p0", "p1", "p2", "p3", "p4"]),
            model: FactorModel::new(
                vec![vec![1.0, 0.0], vec![0.0, 1.0]],
                vec![
                    vec![0.9, 0.1],
                    vec![0.2, 0.8],
                    vec![0.5, 0.5],
                    vec![0.8, 0.0],
                    vec![0.1, 0.3],
                ],
            )
            .expect("consistent factors"),
            interactions: CsrMatrix::from_triplets((2, 5), &[(0, 0, 2.0), (1, 1, 1.0)])
                .expect("valid interactions"),
            co_view: CoViewMap::from_entries([(0, vec![2, 1, 4]), (3, vec![])]),
            popular: PopularityList::new(vec![4, 2, 0, 1, 3]),
            catalog: ProductCatalog::from_reader(
                "item_code,item_id,title,category_id,brand,price\n\
                 0,p0,Trail Shoe,shoes,Stride,89.00\n\
                 1,p1,Wool Sock,socks,Woolly,18.00\n\
                 2,p2,Rain Shell,outerwear,Northline,149.00\n\
                 3,p3,Road Shoe,shoes,Stride,119.00\n\
                 4,p4,Beanie,hats,Capline,19.00\n"
                    .as_bytes(),
            )
            .expect("valid csv"),
            categories,
        }
    }

    /// `small_store` whose user encoder knows a third user, u2, that the model
    /// has no factor row for.
    pub(crate) fn store_with_short_model() -> ArtifactStore {
        ArtifactStore { users: encoder(&["u0", "u1", "u2"]), ..small_store() }
    }
}
