use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub artifacts: ArtifactsConfig,
    pub recommendation: RecommendationConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ArtifactsConfig {
    pub dir: PathBuf,
    pub model_file: String,
    pub user_encoder_file: String,
    pub item_encoder_file: String,
    pub interaction_matrix_file: String,
    pub co_view_file: String,
    pub popular_file: String,
    pub metadata_file: String,
    pub category_relationships_file: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecommendationConfig {
    pub default_count: usize,
    pub max_count: usize,
    pub candidate_multiplier: usize,
    pub popular_multiplier: usize,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub artifacts_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub default_count: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            model_file: "als_model.json".to_string(),
            user_encoder_file: "user_encoder.json".to_string(),
            item_encoder_file: "item_encoder.json".to_string(),
            interaction_matrix_file: "user_item_matrix.json".to_string(),
            co_view_file: "co_view_top.json".to_string(),
            popular_file: "popular_items.json".to_string(),
            metadata_file: "prod_meta.csv".to_string(),
            category_relationships_file: "category_relationships_large.csv".to_string(),
        }
    }
}

impl ArtifactsConfig {
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), ..Self::default() }
    }

    pub fn path_of(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Every configured artifact as `(label, file_name, required)`, in load order.
    pub fn manifest(&self) -> [(&'static str, &str, bool); 8] {
        [
            ("model", self.model_file.as_str(), true),
            ("user_encoder", self.user_encoder_file.as_str(), true),
            ("item_encoder", self.item_encoder_file.as_str(), true),
            ("interaction_matrix", self.interaction_matrix_file.as_str(), true),
            ("metadata", self.metadata_file.as_str(), true),
            ("co_view", self.co_view_file.as_str(), false),
            ("popular", self.popular_file.as_str(), false),
            ("category_relationships", self.category_relationships_file.as_str(), false),
        ]
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self { default_count: 6, max_count: 20, candidate_multiplier: 4, popular_multiplier: 6 }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            artifacts: ArtifactsConfig::default(),
            recommendation: RecommendationConfig::default(),
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8501,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("shelfrec.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(artifacts) = patch.artifacts {
            if let Some(dir) = artifacts.dir {
                self.artifacts.dir = dir;
            }
            let files = [
                (artifacts.model_file, &mut self.artifacts.model_file),
                (artifacts.user_encoder_file, &mut self.artifacts.user_encoder_file),
                (artifacts.item_encoder_file, &mut self.artifacts.item_encoder_file),
                (artifacts.interaction_matrix_file, &mut self.artifacts.interaction_matrix_file),
                (artifacts.co_view_file, &mut self.artifacts.co_view_file),
                (artifacts.popular_file, &mut self.artifacts.popular_file),
                (artifacts.metadata_file, &mut self.artifacts.metadata_file),
                (
                    artifacts.category_relationships_file,
                    &mut self.artifacts.category_relationships_file,
                ),
            ];
            for (value, slot) in files {
                if let Some(value) = value {
                    *slot = value;
                }
            }
        }

        if let Some(recommendation) = patch.recommendation {
            if let Some(default_count) = recommendation.default_count {
                self.recommendation.default_count = default_count;
            }
            if let Some(max_count) = recommendation.max_count {
                self.recommendation.max_count = max_count;
            }
            if let Some(candidate_multiplier) = recommendation.candidate_multiplier {
                self.recommendation.candidate_multiplier = candidate_multiplier;
            }
            if let Some(popular_multiplier) = recommendation.popular_multiplier {
                self.recommendation.popular_multiplier = popular_multiplier;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SHELFREC_ARTIFACTS_DIR") {
            self.artifacts.dir = PathBuf::from(value);
        }
        let files = [
            ("SHELFREC_ARTIFACTS_MODEL_FILE", &mut self.artifacts.model_file),
            ("SHELFREC_ARTIFACTS_USER_ENCODER_FILE", &mut self.artifacts.user_encoder_file),
            ("SHELFREC_ARTIFACTS_ITEM_ENCODER_FILE", &mut self.artifacts.item_encoder_file),
            (
                "SHELFREC_ARTIFACTS_INTERACTION_MATRIX_FILE",
                &mut self.artifacts.interaction_matrix_file,
            ),
            ("SHELFREC_ARTIFACTS_CO_VIEW_FILE", &mut self.artifacts.co_view_file),
            ("SHELFREC_ARTIFACTS_POPULAR_FILE", &mut self.artifacts.popular_file),
            ("SHELFREC_ARTIFACTS_METADATA_FILE", &mut self.artifacts.metadata_file),
            (
                "SHELFREC_ARTIFACTS_CATEGORY_RELATIONSHIPS_FILE",
                &mut self.artifacts.category_relationships_file,
            ),
        ];
        for (key, slot) in files {
            if let Some(value) = read_env(key) {
                *slot = value;
            }
        }

        if let Some(value) = read_env("SHELFREC_RECOMMENDATION_DEFAULT_COUNT") {
            self.recommendation.default_count =
                parse_usize("SHELFREC_RECOMMENDATION_DEFAULT_COUNT", &value)?;
        }
        if let Some(value) = read_env("SHELFREC_RECOMMENDATION_MAX_COUNT") {
            self.recommendation.max_count =
                parse_usize("SHELFREC_RECOMMENDATION_MAX_COUNT", &value)?;
        }
        if let Some(value) = read_env("SHELFREC_RECOMMENDATION_CANDIDATE_MULTIPLIER") {
            self.recommendation.candidate_multiplier =
                parse_usize("SHELFREC_RECOMMENDATION_CANDIDATE_MULTIPLIER", &value)?;
        }
        if let Some(value) = read_env("SHELFREC_RECOMMENDATION_POPULAR_MULTIPLIER") {
            self.recommendation.popular_multiplier =
                parse_usize("SHELFREC_RECOMMENDATION_POPULAR_MULTIPLIER", &value)?;
        }

        if let Some(value) = read_env("SHELFREC_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("SHELFREC_SERVER_PORT") {
            self.server.port = parse_u16("SHELFREC_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("SHELFREC_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("SHELFREC_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level =
            read_env("SHELFREC_LOGGING_LEVEL").or_else(|| read_env("SHELFREC_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SHELFREC_LOGGING_FORMAT").or_else(|| read_env("SHELFREC_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(artifacts_dir) = overrides.artifacts_dir {
            self.artifacts.dir = artifacts_dir;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(default_count) = overrides.default_count {
            self.recommendation.default_count = default_count;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_artifacts(&self.artifacts)?;
        validate_recommendation(&self.recommendation)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("shelfrec.toml"), PathBuf::from("config/shelfrec.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_artifacts(artifacts: &ArtifactsConfig) -> Result<(), ConfigError> {
    if artifacts.dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation("artifacts.dir must not be empty".to_string()));
    }

    for (label, file_name, _) in artifacts.manifest() {
        if file_name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "artifacts.{label}_file must not be empty"
            )));
        }
    }

    Ok(())
}

fn validate_recommendation(recommendation: &RecommendationConfig) -> Result<(), ConfigError> {
    if recommendation.max_count == 0 || recommendation.max_count > 100 {
        return Err(ConfigError::Validation(
            "recommendation.max_count must be in range 1..=100".to_string(),
        ));
    }

    if recommendation.default_count == 0
        || recommendation.default_count > recommendation.max_count
    {
        return Err(ConfigError::Validation(format!(
            "recommendation.default_count must be in range 1..={}",
            recommendation.max_count
        )));
    }

    if recommendation.candidate_multiplier == 0 || recommendation.popular_multiplier == 0 {
        return Err(ConfigError::Validation(
            "recommendation.candidate_multiplier and recommendation.popular_multiplier must be greater than zero"
                .to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    artifacts: Option<ArtifactsPatch>,
    recommendation: Option<RecommendationPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ArtifactsPatch {
    dir: Option<PathBuf>,
    model_file: Option<String>,
    user_encoder_file: Option<String>,
    item_encoder_file: Option<String>,
    interaction_matrix_file: Option<String>,
    co_view_file: Option<String>,
    popular_file: Option<String>,
    metadata_file: Option<String>,
    category_relationships_file: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RecommendationPatch {
    default_count: Option<usize>,
    max_count: Option<usize>,
    candidate_multiplier: Option<usize>,
    popular_multiplier: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_match_demo_layout() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.artifacts.dir == PathBuf::from("data"), "default dir should be data")?;
        ensure(config.recommendation.default_count == 6, "default count should be 6")?;
        ensure(config.recommendation.max_count == 20, "max count should be 20")?;
        ensure(
            config.artifacts.path_of(&config.artifacts.metadata_file)
                == PathBuf::from("data/prod_meta.csv"),
            "metadata path should join dir and file name",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_SHELFREC_DATA_ROOT", "/srv/shelfrec");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("shelfrec.toml");
            fs::write(
                &path,
                r#"
[artifacts]
dir = "${TEST_SHELFREC_DATA_ROOT}/artifacts"
popular_file = "popular.json"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.artifacts.dir == PathBuf::from("/srv/shelfrec/artifacts"),
                "artifact dir should be interpolated from environment",
            )?;
            ensure(config.artifacts.popular_file == "popular.json", "file name should be patched")?;
            ensure(
                config.artifacts.model_file == "als_model.json",
                "unpatched file names keep defaults",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_SHELFREC_DATA_ROOT"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SHELFREC_LOG_LEVEL", "warn");
        env::set_var("SHELFREC_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["SHELFREC_LOG_LEVEL", "SHELFREC_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SHELFREC_ARTIFACTS_DIR", "/from/env");
        env::set_var("SHELFREC_SERVER_PORT", "9100");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("shelfrec.toml");
            fs::write(
                &path,
                r#"
[artifacts]
dir = "/from/file"

[server]
port = 9000
bind_address = "0.0.0.0"

[recommendation]
default_count = 8

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    artifacts_dir: Some(PathBuf::from("/from/override")),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.artifacts.dir == PathBuf::from("/from/override"),
                "override artifact dir should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.server.port == 9100, "env port should win over file")?;
            ensure(config.server.bind_address == "0.0.0.0", "file bind address should apply")?;
            ensure(config.recommendation.default_count == 8, "file default count should apply")?;
            Ok(())
        })();

        clear_vars(&["SHELFREC_ARTIFACTS_DIR", "SHELFREC_SERVER_PORT"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SHELFREC_RECOMMENDATION_DEFAULT_COUNT", "50");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message)
                    if message.contains("recommendation.default_count")
            );
            ensure(has_message, "validation failure should mention recommendation.default_count")
        })();

        clear_vars(&["SHELFREC_RECOMMENDATION_DEFAULT_COUNT"]);
        result
    }

    #[test]
    fn malformed_numeric_env_override_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SHELFREC_SERVER_PORT", "not-a-port");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected env override failure".to_string()),
                Err(error) => error,
            };
            ensure(
                matches!(
                    error,
                    ConfigError::InvalidEnvOverride { ref key, .. } if key == "SHELFREC_SERVER_PORT"
                ),
                "error should name the offending env key",
            )
        })();

        clear_vars(&["SHELFREC_SERVER_PORT"]);
        result
    }

    #[test]
    fn required_file_missing_is_an_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let missing = dir.path().join("absent.toml");
        let result = AppConfig::load(LoadOptions {
            config_path: Some(missing),
            require_file: true,
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "missing required config file should be reported",
        )
    }
}
