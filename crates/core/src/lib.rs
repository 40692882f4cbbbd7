pub mod artifacts;
pub mod config;
pub mod errors;
pub mod fixtures;
pub mod recommend;

pub use artifacts::{ArtifactStore, ArtifactSummary, ProductMetadata};
pub use config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};
pub use errors::{ApplicationError, ArtifactError, GeneratorError, InterfaceError, LookupMiss};
pub use fixtures::{DemoArtifacts, SeedError};
pub use recommend::{
    RecommendationEngine, RecommendationRequest, RecommendationResponse, RecommendedItem, Source,
};
