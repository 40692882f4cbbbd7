//! Read-only recommendation artifacts
//!
//! Everything here is produced offline and loaded once at startup. Required
//! artifacts (model, encoders, interaction matrix, metadata) must be present
//! and consistent; optional ones fall back to empty structures.

mod catalog;
mod categories;
mod coview;
mod encoder;
mod matrix;
mod model;
mod store;

pub use catalog::{ProductCatalog, ProductMetadata};
pub use categories::CategoryRelationships;
pub use coview::{CoViewMap, PopularityList};
pub use encoder::LabelEncoder;
pub use matrix::CsrMatrix;
pub use model::{FactorModel, ScoredItem};
pub use store::{ArtifactStore, ArtifactSummary};
