use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const DEFAULT_EMBEDDING_DIMENSION: u32 = 384;
pub const DEFAULT_LLM_BASE_URL: &str = "http://localhost:1234/v1";
pub const DEFAULT_LLM_MODEL: &str = "llama-3.2-3b-instruct";
pub const DEFAULT_PORT: u16 = 8000;

/// Upper bound on sampling temperature; grounded answers need near-deterministic sampling.
pub const MAX_TEMPERATURE: f32 = 0.3;

pub const ENV_VECTOR_URL: &str = "JARVIS_VECTOR_URL";
pub const ENV_VECTOR_API_KEY: &str = "JARVIS_VECTOR_API_KEY";
pub const ENV_COLLECTION: &str = "JARVIS_COLLECTION";
pub const ENV_LLM_BASE_URL: &str = "JARVIS_LLM_BASE_URL";
pub const ENV_LLM_MODEL: &str = "JARVIS_LLM_MODEL";
pub const ENV_LLM_TEMPERATURE: &str = "JARVIS_LLM_TEMPERATURE";
pub const ENV_LLM_TIMEOUT_SECS: &str = "JARVIS_LLM_TIMEOUT_SECS";
pub const ENV_EMBEDDING_MODEL_PATH: &str = "JARVIS_EMBEDDING_MODEL_PATH";
pub const ENV_PORT: &str = "PORT";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("jarvis").join("config.toml"))
    }

    pub fn models_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("jarvis").join("models"))
    }

    /// Load configuration: defaults, then the TOML file, then process environment.
    ///
    /// An explicit `path` must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Overlay values from an environment-style lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup(ENV_VECTOR_URL) {
            self.vector_store.url = Some(url);
        }
        if let Some(key) = lookup(ENV_VECTOR_API_KEY) {
            self.vector_store.api_key = Some(key);
        }
        if let Some(collection) = lookup(ENV_COLLECTION) {
            self.vector_store.collection = Some(collection);
        }
        if let Some(base_url) = lookup(ENV_LLM_BASE_URL) {
            self.llm.base_url = base_url;
        }
        if let Some(model) = lookup(ENV_LLM_MODEL) {
            self.llm.model = model;
        }
        if let Some(temperature) = lookup(ENV_LLM_TEMPERATURE) {
            self.llm.temperature = temperature.parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "{ENV_LLM_TEMPERATURE} must be a number, got '{temperature}'"
                ))
            })?;
        }
        if let Some(timeout) = lookup(ENV_LLM_TIMEOUT_SECS) {
            self.llm.timeout_secs = timeout.parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "{ENV_LLM_TIMEOUT_SECS} must be a whole number of seconds, got '{timeout}'"
                ))
            })?;
        }
        if let Some(path) = lookup(ENV_EMBEDDING_MODEL_PATH) {
            self.embedding.model_path = Some(PathBuf::from(path));
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port.parse().map_err(|_| {
                ConfigError::ValidationError(format!("{ENV_PORT} must be a port number, got '{port}'"))
            })?;
        }

        Ok(())
    }

    /// Check that every setting needed to serve requests is present and sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vector_store.url.is_none() {
            return Err(ConfigError::Missing(ENV_VECTOR_URL));
        }
        if self.vector_store.collection.is_none() {
            return Err(ConfigError::Missing(ENV_COLLECTION));
        }
        if !(0.0..=MAX_TEMPERATURE).contains(&self.llm.temperature) {
            return Err(ConfigError::ValidationError(format!(
                "llm temperature must be between 0.0 and {MAX_TEMPERATURE}, got {}",
                self.llm.temperature
            )));
        }
        if self.embedding.dimension == 0 {
            return Err(ConfigError::ValidationError(
                "embedding dimension must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Copy suitable for display, with secrets masked.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if let Some(ref key) = config.vector_store.api_key {
            config.vector_store.api_key = Some(mask_secret(key));
        }
        config
    }
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_model")]
    pub model_id: String,

    /// Directory holding `model.onnx` and `tokenizer.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,

    #[serde(default = "default_dimension")]
    pub dimension: u32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl EmbeddingConfig {
    pub fn model_dir(&self) -> Option<PathBuf> {
        self.model_path.clone().or_else(|| {
            Config::models_dir().map(|dir| dir.join(self.model_id.replace('/', "--")))
        })
    }
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_dimension() -> u32 {
    DEFAULT_EMBEDDING_DIMENSION
}

fn default_max_tokens() -> u32 {
    256
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_id: default_embedding_model(),
            model_path: None,
            dimension: default_dimension(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,

    #[serde(default = "default_vector_timeout")]
    pub timeout_secs: u64,
}

fn default_vector_timeout() -> u64 {
    30
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            collection: None,
            timeout_secs: default_vector_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_llm_base_url() -> String {
    DEFAULT_LLM_BASE_URL.to_string()
}

fn default_llm_model() -> String {
    DEFAULT_LLM_MODEL.to_string()
}

fn default_temperature() -> f32 {
    MAX_TEMPERATURE
}

fn default_llm_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            temperature: default_temperature(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn valid_config() -> Config {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                (ENV_VECTOR_URL, "http://localhost:6334"),
                (ENV_COLLECTION, "jarvis"),
            ]))
            .unwrap();
        config
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.llm.base_url, DEFAULT_LLM_BASE_URL);
        assert_eq!(config.llm.model, DEFAULT_LLM_MODEL);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.embedding.dimension, 384);
        assert!(config.llm.temperature <= MAX_TEMPERATURE);
        assert!(config.vector_store.url.is_none());
    }

    #[test]
    fn test_validate_requires_vector_settings() {
        let config = Config::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing(ENV_VECTOR_URL))
        ));

        let mut config = Config::default();
        config
            .apply_env(env(&[(ENV_VECTOR_URL, "http://localhost:6334")]))
            .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing(ENV_COLLECTION))
        ));

        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_apply_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                (ENV_LLM_BASE_URL, "http://gpu-box:1234/v1"),
                (ENV_LLM_MODEL, "qwen2.5-7b-instruct"),
                (ENV_LLM_TEMPERATURE, "0.1"),
                (ENV_PORT, "9000"),
                (ENV_VECTOR_API_KEY, "secret-key-value"),
            ]))
            .unwrap();

        assert_eq!(config.llm.base_url, "http://gpu-box:1234/v1");
        assert_eq!(config.llm.model, "qwen2.5-7b-instruct");
        assert!((config.llm.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.vector_store.api_key.as_deref(),
            Some("secret-key-value")
        );
    }

    #[test]
    fn test_apply_env_ignores_blank_values() {
        let mut config = Config::default();
        config.apply_env(env(&[(ENV_VECTOR_URL, "  ")])).unwrap();
        assert!(config.vector_store.url.is_none());
    }

    #[test]
    fn test_apply_env_rejects_bad_port() {
        let mut config = Config::default();
        let result = config.apply_env(env(&[(ENV_PORT, "eighty")]));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_rejects_high_temperature() {
        let mut config = valid_config();
        config.llm.temperature = 0.9;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[vector_store]
url = "http://qdrant:6334"
collection = "product-docs"

[llm]
model = "mistral-7b-instruct"

[server]
port = 8080
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.vector_store.url.as_deref(), Some("http://qdrant:6334"));
        assert_eq!(
            config.vector_store.collection.as_deref(),
            Some("product-docs")
        );
        assert_eq!(config.llm.model, "mistral-7b-instruct");
        assert_eq!(config.llm.base_url, DEFAULT_LLM_BASE_URL);
        assert_eq!(config.server.port, 8080);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_redacted_masks_api_key() {
        let mut config = valid_config();
        config.vector_store.api_key = Some("abcd1234efgh5678".to_string());
        let redacted = config.redacted();
        assert_eq!(redacted.vector_store.api_key.as_deref(), Some("abcd****"));

        config.vector_store.api_key = Some("short".to_string());
        assert_eq!(
            config.redacted().vector_store.api_key.as_deref(),
            Some("****")
        );
    }

    #[test]
    fn test_model_dir_prefers_explicit_path() {
        let config = EmbeddingConfig {
            model_path: Some(PathBuf::from("/opt/models/minilm")),
            ..Default::default()
        };
        assert_eq!(config.model_dir(), Some(PathBuf::from("/opt/models/minilm")));
    }
}
