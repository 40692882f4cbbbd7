use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use super::catalog::ProductCatalog;
use super::categories::CategoryRelationships;
use super::coview::{CoViewMap, PopularityList};
use super::encoder::LabelEncoder;
use super::matrix::CsrMatrix;
use super::model::FactorModel;
use crate::config::ArtifactsConfig;
use crate::errors::ArtifactError;

/// Every precomputed structure the pipeline reads. Built once, never mutated.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    pub users: LabelEncoder,
    pub items: LabelEncoder,
    pub model: FactorModel,
    pub interactions: CsrMatrix,
    pub co_view: CoViewMap,
    pub popular: PopularityList,
    pub catalog: ProductCatalog,
    pub categories: CategoryRelationships,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArtifactSummary {
    pub users: usize,
    pub items: usize,
    pub factors: usize,
    pub interactions: usize,
    pub co_view_entries: usize,
    pub popular_items: usize,
    pub metadata_by_code: usize,
    pub metadata_by_item_id: usize,
    pub category_relationships: usize,
}

impl ArtifactStore {
    pub fn load(config: &ArtifactsConfig) -> Result<Self, ArtifactError> {
        info!(
            event_name = "system.artifacts.load_start",
            correlation_id = "bootstrap",
            dir = %config.dir.display(),
            "loading recommendation artifacts"
        );

        let model: FactorModel =
            read_json("model", &required("model", config, &config.model_file)?)?;
        let users: LabelEncoder = read_json(
            "user_encoder",
            &required("user_encoder", config, &config.user_encoder_file)?,
        )?;
        let items: LabelEncoder = read_json(
            "item_encoder",
            &required("item_encoder", config, &config.item_encoder_file)?,
        )?;
        let interactions: CsrMatrix = read_json(
            "interaction_matrix",
            &required("interaction_matrix", config, &config.interaction_matrix_file)?,
        )?;
        let catalog = read_csv(
            "metadata",
            &required("metadata", config, &config.metadata_file)?,
            ProductCatalog::from_reader,
        )?;

        let co_view = optional("co_view", &config.path_of(&config.co_view_file), |path| {
            let map = CoViewMap::from_json(&read_text("co_view", path)?)
                .map_err(|message| ArtifactError::invalid("co_view", message))?;
            report_unknown_codes("co_view", map.codes(), &items);
            Ok(map)
        });
        let popular = optional("popular", &config.path_of(&config.popular_file), |path| {
            let list = PopularityList::from_json(&read_text("popular", path)?)
                .map_err(|message| ArtifactError::invalid("popular", message))?;
            report_unknown_codes("popular", list.codes().iter().copied(), &items);
            Ok(list)
        });
        let categories = optional(
            "category_relationships",
            &config.path_of(&config.category_relationships_file),
            |path| read_csv("category_relationships", path, CategoryRelationships::from_reader),
        );

        let store =
            Self { users, items, model, interactions, co_view, popular, catalog, categories };
        store.validate()?;

        info!(
            event_name = "system.artifacts.load_complete",
            correlation_id = "bootstrap",
            users = store.users.len(),
            items = store.items.len(),
            co_view_entries = store.co_view.len(),
            popular_items = store.popular.len(),
            "recommendation artifacts ready"
        );
        Ok(store)
    }

    /// Cross-artifact consistency of the required artifacts.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        let expected = (self.model.users(), self.model.items());
        let actual = (self.interactions.rows(), self.interactions.cols());
        if expected != actual {
            return Err(ArtifactError::invalid(
                "interaction_matrix",
                format!(
                    "shape {}x{} does not match the model ({}x{})",
                    actual.0, actual.1, expected.0, expected.1
                ),
            ));
        }
        if self.model.users() > self.users.len() {
            return Err(ArtifactError::invalid(
                "model",
                format!(
                    "model has {} users but the user encoder only knows {}",
                    self.model.users(),
                    self.users.len()
                ),
            ));
        }
        if self.model.items() > self.items.len() {
            return Err(ArtifactError::invalid(
                "model",
                format!(
                    "model has {} items but the item encoder only knows {}",
                    self.model.items(),
                    self.items.len()
                ),
            ));
        }
        Ok(())
    }

    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            users: self.users.len(),
            items: self.items.len(),
            factors: self.model.factors(),
            interactions: self.interactions.nnz(),
            co_view_entries: self.co_view.len(),
            popular_items: self.popular.len(),
            metadata_by_code: self.catalog.code_entries(),
            metadata_by_item_id: self.catalog.item_id_entries(),
            category_relationships: self.categories.len(),
        }
    }
}

fn required(
    name: &'static str,
    config: &ArtifactsConfig,
    file_name: &str,
) -> Result<PathBuf, ArtifactError> {
    let path = config.path_of(file_name);
    if !path.exists() {
        return Err(ArtifactError::Missing { name, path });
    }
    Ok(path)
}

fn read_json<T: DeserializeOwned>(name: &'static str, path: &Path) -> Result<T, ArtifactError> {
    let raw = fs::read(path)
        .map_err(|source| ArtifactError::Read { path: path.to_path_buf(), source })?;
    let value = serde_json::from_slice(&raw)
        .map_err(|source| ArtifactError::ParseJson { path: path.to_path_buf(), source })?;
    info!(
        event_name = "system.artifacts.loaded",
        correlation_id = "bootstrap",
        artifact = name,
        path = %path.display(),
        "artifact loaded"
    );
    Ok(value)
}

fn read_csv<T>(
    name: &'static str,
    path: &Path,
    parse: impl FnOnce(File) -> Result<T, csv::Error>,
) -> Result<T, ArtifactError> {
    let file = File::open(path)
        .map_err(|source| ArtifactError::Read { path: path.to_path_buf(), source })?;
    let value =
        parse(file).map_err(|source| ArtifactError::ParseCsv { path: path.to_path_buf(), source })?;
    info!(
        event_name = "system.artifacts.loaded",
        correlation_id = "bootstrap",
        artifact = name,
        path = %path.display(),
        "artifact loaded"
    );
    Ok(value)
}

/// Non-essential artifacts degrade to an empty structure instead of failing startup.
fn optional<T: Default>(
    name: &'static str,
    path: &Path,
    load: impl FnOnce(&Path) -> Result<T, ArtifactError>,
) -> T {
    if !path.exists() {
        info!(
            event_name = "system.artifacts.optional_missing",
            correlation_id = "bootstrap",
            artifact = name,
            path = %path.display(),
            "optional artifact not present, continuing without it"
        );
        return T::default();
    }

    match load(path) {
        Ok(value) => value,
        Err(error) => {
            warn!(
                event_name = "system.artifacts.optional_degraded",
                correlation_id = "bootstrap",
                artifact = name,
                error = %error,
                "optional artifact unusable, continuing without it"
            );
            T::default()
        }
    }
}

fn read_text(name: &'static str, path: &Path) -> Result<String, ArtifactError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ArtifactError::Read { path: path.to_path_buf(), source })?;
    info!(
        event_name = "system.artifacts.loaded",
        correlation_id = "bootstrap",
        artifact = name,
        path = %path.display(),
        "artifact loaded"
    );
    Ok(raw)
}

/// Codes the item encoder cannot decode stay in place; lookups that hit them
/// come back empty for that request only.
fn report_unknown_codes(
    name: &'static str,
    codes: impl Iterator<Item = u32>,
    items: &LabelEncoder,
) {
    let unknown: BTreeSet<u32> = codes.filter(|code| *code as usize >= items.len()).collect();
    if unknown.is_empty() {
        return;
    }
    warn!(
        event_name = "system.artifacts.unknown_codes",
        correlation_id = "bootstrap",
        artifact = name,
        codes = ?unknown,
        encoder_items = items.len(),
        "artifact references item codes outside the item encoder"
    );
}
