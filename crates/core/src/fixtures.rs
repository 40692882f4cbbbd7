//! Deterministic demo artifact set
//!
//! Small enough to read by eye, rich enough to exercise every candidate
//! source, the category filter, and popularity backfill.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use thiserror::Error;

use crate::artifacts::{
    ArtifactStore, CategoryRelationships, CoViewMap, CsrMatrix, FactorModel, LabelEncoder,
    PopularityList, ProductCatalog,
};
use crate::config::ArtifactsConfig;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("artifact `{0}` already exists, pass --force to overwrite")]
    AlreadyExists(PathBuf),
    #[error("could not write `{path}`: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("could not encode demo data: {0}")]
    Encode(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct DemoProduct {
    pub item_id: &'static str,
    pub title: &'static str,
    pub category_id: &'static str,
    pub brand: &'static str,
    pub price: &'static str,
    pub image_url: Option<&'static str>,
    /// Rows without a code are only reachable through the item_id index.
    pub has_code: bool,
}

const fn product(
    item_id: &'static str,
    title: &'static str,
    category_id: &'static str,
    brand: &'static str,
    price: &'static str,
) -> DemoProduct {
    DemoProduct { item_id, title, category_id, brand, price, image_url: None, has_code: true }
}

const PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        image_url: Some("/static/placeholder.svg"),
        ..product("p1000", "Trail Runner", "shoes", "Stride", "89.00")
    },
    product("p1001", "Road Racer", "shoes", "Stride", "119.00"),
    product("p1002", "Merino Crew Socks", "socks", "Woolly", "18.00"),
    product("p1003", "Compression Socks", "socks", "Woolly", "24.00"),
    DemoProduct {
        image_url: Some("/static/placeholder.svg"),
        ..product("p1004", "Packable Rain Shell", "outerwear", "Northline", "149.00")
    },
    product("p1005", "Down Vest", "outerwear", "Northline", "99.00"),
    product("p1006", "Trail Cap", "hats", "Capline", "22.00"),
    product("p1007", "Rib Beanie", "hats", "Capline", "19.00"),
    product("p1008", "Hydration Vest", "packs", "Carrylight", "79.00"),
    product("p1009", "20L Day Pack", "packs", "Carrylight", "65.00"),
    product("p1010", "Trail Headlamp", "lighting", "Lumen", "39.00"),
    DemoProduct {
        has_code: false,
        ..product("p1011", "Camp Lantern", "lighting", "Lumen", "45.00")
    },
];

const USERS: &[&str] = &["u1", "u2", "u3", "u4", "u5"];

/// Three latent axes: running, weather, gear.
const USER_FACTORS: &[[f32; 3]] = &[
    [1.0, 0.2, 0.1],
    [0.1, 1.0, 0.2],
    [0.2, 0.1, 1.0],
    [0.6, 0.6, 0.0],
    [0.3, 0.3, 0.3],
];

const ITEM_FACTORS: &[[f32; 3]] = &[
    [0.95, 0.10, 0.05],
    [0.90, 0.05, 0.10],
    [0.70, 0.20, 0.00],
    [0.65, 0.10, 0.05],
    [0.10, 0.95, 0.10],
    [0.05, 0.85, 0.05],
    [0.30, 0.60, 0.10],
    [0.00, 0.70, 0.00],
    [0.40, 0.05, 0.80],
    [0.10, 0.10, 0.90],
    [0.20, 0.00, 0.85],
    [0.00, 0.10, 0.75],
];

/// `(user, item code, strength)`
const INTERACTIONS: &[(usize, u32, f32)] = &[
    (0, 0, 3.0),
    (0, 2, 1.0),
    (1, 4, 2.0),
    (2, 9, 1.0),
    (2, 10, 2.0),
    (3, 1, 1.0),
    (3, 5, 1.0),
];

const CO_VIEW: &[(u32, &[u32])] = &[
    (0, &[2, 1, 3, 6]),
    (1, &[0, 3, 2]),
    (2, &[3, 0]),
    (4, &[5, 7, 6]),
    (5, &[4, 7]),
    (8, &[9, 10]),
    (9, &[8, 11, 10]),
    (10, &[11, 9]),
];

const POPULAR: &[u32] = &[0, 4, 9, 2, 10, 1, 5, 6, 8, 3, 7, 11];

const RELATIONSHIPS: &[(&str, &str)] = &[
    ("shoes", "socks"),
    ("shoes", "packs"),
    ("socks", "shoes"),
    ("outerwear", "hats"),
    ("hats", "outerwear"),
    ("packs", "lighting"),
    ("lighting", "packs"),
];

#[derive(Clone, Copy, Debug, Default)]
pub struct DemoArtifacts;

impl DemoArtifacts {
    pub fn products(&self) -> &'static [DemoProduct] {
        PRODUCTS
    }

    pub fn users(&self) -> &'static [&'static str] {
        USERS
    }

    /// Builds the store in memory, without touching the filesystem.
    pub fn build_store(&self) -> Result<ArtifactStore, SeedError> {
        let store = ArtifactStore {
            users: LabelEncoder::from_classes(USERS.iter().map(|user| user.to_string()).collect())
                .map_err(SeedError::Encode)?,
            items: LabelEncoder::from_classes(
                PRODUCTS.iter().map(|product| product.item_id.to_string()).collect(),
            )
            .map_err(SeedError::Encode)?,
            model: FactorModel::new(rows(USER_FACTORS), rows(ITEM_FACTORS))
                .map_err(SeedError::Encode)?,
            interactions: interaction_matrix()?,
            co_view: CoViewMap::from_entries(
                CO_VIEW.iter().map(|(code, related)| (*code, related.to_vec())),
            ),
            popular: PopularityList::new(POPULAR.to_vec()),
            catalog: ProductCatalog::from_reader(metadata_csv()?.as_bytes())
                .map_err(|error| SeedError::Encode(error.to_string()))?,
            categories: {
                let mut categories = CategoryRelationships::default();
                for (main, related) in RELATIONSHIPS {
                    categories.insert(*main, *related);
                }
                categories
            },
        };
        store.validate().map_err(|error| SeedError::Encode(error.to_string()))?;
        Ok(store)
    }

    /// Writes every artifact under the configured names. Existing files are
    /// only replaced with `force`.
    pub fn write_to(
        &self,
        config: &ArtifactsConfig,
        force: bool,
    ) -> Result<Vec<PathBuf>, SeedError> {
        let store = self.build_store()?;
        let co_view: serde_json::Map<String, Value> = CO_VIEW
            .iter()
            .map(|(code, related)| (code.to_string(), json!(related)))
            .collect();

        let files = [
            (&config.model_file, to_json(&store.model)?),
            (&config.user_encoder_file, to_json(&store.users)?),
            (&config.item_encoder_file, to_json(&store.items)?),
            (&config.interaction_matrix_file, to_json(&store.interactions)?),
            (&config.co_view_file, to_json(&co_view)?),
            (&config.popular_file, to_json(&POPULAR)?),
            (&config.metadata_file, metadata_csv()?),
            (&config.category_relationships_file, relationships_csv()?),
        ];

        let paths: Vec<PathBuf> = files.iter().map(|(name, _)| config.path_of(name)).collect();
        if !force {
            if let Some(existing) = paths.iter().find(|path| path.exists()) {
                return Err(SeedError::AlreadyExists(existing.clone()));
            }
        }

        fs::create_dir_all(&config.dir)
            .map_err(|source| SeedError::Write { path: config.dir.clone(), source })?;
        for (path, (_, contents)) in paths.iter().zip(files.iter()) {
            write_file(path, contents)?;
        }
        Ok(paths)
    }
}

fn rows(factors: &[[f32; 3]]) -> Vec<Vec<f32>> {
    factors.iter().map(|row| row.to_vec()).collect()
}

fn interaction_matrix() -> Result<CsrMatrix, SeedError> {
    CsrMatrix::from_triplets((USERS.len(), PRODUCTS.len()), INTERACTIONS).map_err(SeedError::Encode)
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, SeedError> {
    serde_json::to_string_pretty(value).map_err(|error| SeedError::Encode(error.to_string()))
}

fn metadata_csv() -> Result<String, SeedError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let encode = |error: csv::Error| SeedError::Encode(error.to_string());

    writer
        .write_record([
            "item_code",
            "item_id",
            "title",
            "category_id",
            "brand",
            "price",
            "image_url",
        ])
        .map_err(encode)?;
    for (code, product) in PRODUCTS.iter().enumerate() {
        let code = if product.has_code { code.to_string() } else { String::new() };
        writer
            .write_record([
                code.as_str(),
                product.item_id,
                product.title,
                product.category_id,
                product.brand,
                product.price,
                product.image_url.unwrap_or_default(),
            ])
            .map_err(encode)?;
    }
    finish_csv(writer)
}

fn relationships_csv() -> Result<String, SeedError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let encode = |error: csv::Error| SeedError::Encode(error.to_string());

    writer.write_record(["main_category", "related_category"]).map_err(encode)?;
    for (main, related) in RELATIONSHIPS {
        writer.write_record([*main, *related]).map_err(encode)?;
    }
    finish_csv(writer)
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String, SeedError> {
    let bytes = writer.into_inner().map_err(|error| SeedError::Encode(error.to_string()))?;
    String::from_utf8(bytes).map_err(|error| SeedError::Encode(error.to_string()))
}

fn write_file(path: &Path, contents: &str) -> Result<(), SeedError> {
    fs::write(path, contents)
        .map_err(|source| SeedError::Write { path: path.to_path_buf(), source })
}
