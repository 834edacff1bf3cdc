use std::path::PathBuf;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::classifier::{DEFAULT_API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::error::MoodError;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MoodConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub classifier: ClassifierSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the CSV log; `~` and `$VAR` are expanded.
    pub log_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            log_path: "mood_data.csv".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClassifierSettings {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_seconds: u64,
    pub max_retries: usize,
    pub retry_delay_ms: u64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_seconds: 30,
            max_retries: 2,
            retry_delay_ms: 100,
        }
    }
}

impl MoodConfig {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .build()?;
        s.try_deserialize()
    }

    /// The log path with `~` and environment variables expanded.
    pub fn log_path(&self) -> Result<PathBuf, MoodError> {
        let raw = &self.storage.log_path;
        shellexpand::full(raw)
            .map(|p| PathBuf::from(p.as_ref()))
            .map_err(|e| MoodError::Path {
                path: raw.clone(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.toml");
        let config = MoodConfig::load(path.to_str().unwrap()).unwrap();

        assert_eq!(config.service.log_level, "warn");
        assert_eq!(config.storage.log_path, "mood_data.csv");
        assert_eq!(config.classifier.api_key_env, "HUGGINGFACE_API_KEY");
        assert_eq!(config.classifier.max_retries, 2);
    }

    #[test]
    fn test_partial_file_overrides_only_given_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("moodlog.toml");
        std::fs::write(
            &path,
            r#"
[storage]
log_path = "/tmp/moods.csv"

[classifier]
model = "meta-llama/Llama-3.1-8B-Instruct"
max_retries = 0
"#,
        )
        .unwrap();

        let config = MoodConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.storage.log_path, "/tmp/moods.csv");
        assert_eq!(config.classifier.model, "meta-llama/Llama-3.1-8B-Instruct");
        assert_eq!(config.classifier.max_retries, 0);
        assert_eq!(config.classifier.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.service.log_level, "warn");
    }

    #[test]
    fn test_log_path_expands_env_vars() {
        let config = MoodConfig {
            storage: StorageConfig {
                log_path: "$MOODLOG_TEST_UNSET_VARIABLE/mood.csv".to_string(),
            },
            ..MoodConfig::default()
        };
        assert!(matches!(config.log_path(), Err(MoodError::Path { .. })));

        let plain = MoodConfig::default();
        assert_eq!(plain.log_path().unwrap(), PathBuf::from("mood_data.csv"));
    }
}
