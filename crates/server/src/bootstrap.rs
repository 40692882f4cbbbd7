use std::sync::Arc;

use shelfrec_core::config::{AppConfig, ConfigError};
use shelfrec_core::{ArtifactError, ArtifactStore, RecommendationEngine};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub engine: Arc<RecommendationEngine>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("artifact loading failed: {0}")]
    Artifacts(#[from] ArtifactError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        artifacts_dir = %config.artifacts.dir.display(),
        "starting application bootstrap"
    );

    let store = ArtifactStore::load(&config.artifacts)?;
    let summary = store.summary();
    let engine =
        Arc::new(RecommendationEngine::new(Arc::new(store), config.recommendation.clone()));

    info!(
        event_name = "system.bootstrap.complete",
        correlation_id = "bootstrap",
        users = summary.users,
        items = summary.items,
        "application bootstrap complete"
    );

    Ok(Application { config, engine })
}

#[cfg(test)]
mod tests {
    use shelfrec_core::config::{AppConfig, ArtifactsConfig, ConfigOverrides, LoadOptions};
    use shelfrec_core::{ArtifactError, DemoArtifacts};
    use tempfile::TempDir;

    use crate::bootstrap::{bootstrap_with_config, Application, BootstrapError};

    fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
        bootstrap_with_config(AppConfig::load(options)?)
    }

    fn options_for(dir: &std::path::Path) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                artifacts_dir: Some(dir.to_path_buf()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[test]
    fn bootstrap_loads_seeded_artifacts() {
        let dir = TempDir::new().expect("temp dir");
        DemoArtifacts
            .write_to(&ArtifactsConfig::with_dir(dir.path()), false)
            .expect("seed demo artifacts");

        let app = bootstrap(options_for(dir.path())).expect("bootstrap should succeed");

        assert_eq!(app.config.artifacts.dir, dir.path());
        assert_eq!(app.engine.store().items.len(), 12);
        assert_eq!(app.engine.settings().default_count, 6);
    }

    #[test]
    fn bootstrap_fails_when_required_artifacts_are_missing() {
        let dir = TempDir::new().expect("temp dir");

        let error = match bootstrap(options_for(dir.path())) {
            Ok(_) => panic!("empty artifact dir must not bootstrap"),
            Err(error) => error,
        };

        assert!(matches!(error, BootstrapError::Artifacts(ArtifactError::Missing { .. })));
        assert!(error.to_string().contains("als_model.json"));
    }
}
