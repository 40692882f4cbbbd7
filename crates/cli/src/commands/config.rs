use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use shelfrec_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let artifacts = &config.artifacts;

    let entries = [
        entry("artifacts.dir", artifacts.dir.display().to_string(), &["SHELFREC_ARTIFACTS_DIR"]),
        entry(
            "artifacts.model_file",
            artifacts.model_file.clone(),
            &["SHELFREC_ARTIFACTS_MODEL_FILE"],
        ),
        entry(
            "artifacts.user_encoder_file",
            artifacts.user_encoder_file.clone(),
            &["SHELFREC_ARTIFACTS_USER_ENCODER_FILE"],
        ),
        entry(
            "artifacts.item_encoder_file",
            artifacts.item_encoder_file.clone(),
            &["SHELFREC_ARTIFACTS_ITEM_ENCODER_FILE"],
        ),
        entry(
            "artifacts.interaction_matrix_file",
            artifacts.interaction_matrix_file.clone(),
            &["SHELFREC_ARTIFACTS_INTERACTION_MATRIX_FILE"],
        ),
        entry(
            "artifacts.co_view_file",
            artifacts.co_view_file.clone(),
            &["SHELFREC_ARTIFACTS_CO_VIEW_FILE"],
        ),
        entry(
            "artifacts.popular_file",
            artifacts.popular_file.clone(),
            &["SHELFREC_ARTIFACTS_POPULAR_FILE"],
        ),
        entry(
            "artifacts.metadata_file",
            artifacts.metadata_file.clone(),
            &["SHELFREC_ARTIFACTS_METADATA_FILE"],
        ),
        entry(
            "artifacts.category_relationships_file",
            artifacts.category_relationships_file.clone(),
            &["SHELFREC_ARTIFACTS_CATEGORY_RELATIONSHIPS_FILE"],
        ),
        entry(
            "recommendation.default_count",
            config.recommendation.default_count.to_string(),
            &["SHELFREC_RECOMMENDATION_DEFAULT_COUNT"],
        ),
        entry(
            "recommendation.max_count",
            config.recommendation.max_count.to_string(),
            &["SHELFREC_RECOMMENDATION_MAX_COUNT"],
        ),
        entry(
            "recommendation.candidate_multiplier",
            config.recommendation.candidate_multiplier.to_string(),
            &["SHELFREC_RECOMMENDATION_CANDIDATE_MULTIPLIER"],
        ),
        entry(
            "recommendation.popular_multiplier",
            config.recommendation.popular_multiplier.to_string(),
            &["SHELFREC_RECOMMENDATION_POPULAR_MULTIPLIER"],
        ),
        entry(
            "server.bind_address",
            config.server.bind_address.clone(),
            &["SHELFREC_SERVER_BIND_ADDRESS"],
        ),
        entry("server.port", config.server.port.to_string(), &["SHELFREC_SERVER_PORT"]),
        entry(
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["SHELFREC_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        entry(
            "logging.level",
            config.logging.level.clone(),
            &["SHELFREC_LOGGING_LEVEL", "SHELFREC_LOG_LEVEL"],
        ),
        entry(
            "logging.format",
            format!("{:?}", config.logging.format).to_ascii_lowercase(),
            &["SHELFREC_LOGGING_FORMAT", "SHELFREC_LOG_FORMAT"],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for ConfigEntry { key_path, value, env_keys } in entries {
        let source = field_source(
            key_path,
            env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(key_path, &value, source));
    }

    lines.join("\n")
}

struct ConfigEntry {
    key_path: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

fn entry(key_path: &'static str, value: String, env_keys: &'static [&'static str]) -> ConfigEntry {
    ConfigEntry { key_path, value, env_keys }
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("shelfrec.toml"), PathBuf::from("config/shelfrec.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use super::contains_path;

    #[test]
    fn nested_key_lookup_follows_dotted_path() {
        let doc: toml::Value = "[artifacts]\ndir = \"data\"\n".parse().expect("valid toml");

        assert!(contains_path(&doc, "artifacts.dir"));
        assert!(!contains_path(&doc, "artifacts.model_file"));
        assert!(!contains_path(&doc, "server.port"));
    }
}
