use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_MODEL_ID: &str = "openai/clip-vit-base-patch32";
pub const DEFAULT_EMBEDDING_DIMENSION: u32 = 512;
pub const DEFAULT_IMAGE_SIZE: u32 = 224;
pub const DEFAULT_CONTROL_PLANE_URL: &str = "https://api.pinecone.io";
pub const DEFAULT_PINECONE_API_VERSION: &str = "2024-07";
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

pub const ENV_MENU_ENDPOINT: &str = "NESTJS_MENU_ENDPOINT";
pub const ENV_PINECONE_API_KEY: &str = "PINECONE_API_KEY";
pub const ENV_PINECONE_INDEX: &str = "PINECONE_INDEX";
pub const ENV_PINECONE_HOST: &str = "PINECONE_HOST";
pub const ENV_MODEL_PATH: &str = "CLIP_MODEL_PATH";
pub const ENV_DEVICE: &str = "CLIP_DEVICE";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub pinecone: PineconeConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("menu-seeder").join("config.toml"))
    }

    pub fn models_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("menu-seeder").join("models"))
    }

    /// Load the config file (if any), then `.env`, then process environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply environment overrides. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = get(ENV_MENU_ENDPOINT) {
            self.catalog.endpoint = endpoint;
        }
        if let Some(api_key) = get(ENV_PINECONE_API_KEY) {
            self.pinecone.api_key = Some(api_key);
        }
        if let Some(index) = get(ENV_PINECONE_INDEX) {
            self.pinecone.index = index;
        }
        if let Some(host) = get(ENV_PINECONE_HOST) {
            self.pinecone.host = Some(host);
        }
        if let Some(path) = get(ENV_MODEL_PATH) {
            self.embedding.model_path = Some(PathBuf::from(path));
        }
        if let Some(device) = get(ENV_DEVICE) {
            self.embedding.device = device.parse().map_err(ConfigError::ValidationError)?;
        }
        Ok(())
    }

    pub fn validate_for_seed(&self) -> Result<(), ConfigError> {
        self.validate_for_serve()?;
        if self.pinecone.api_key.is_none() {
            return Err(missing(ENV_PINECONE_API_KEY));
        }
        if self.pinecone.index.is_empty() {
            return Err(missing(ENV_PINECONE_INDEX));
        }
        Ok(())
    }

    pub fn validate_for_serve(&self) -> Result<(), ConfigError> {
        if self.catalog.endpoint.is_empty() {
            return Err(missing(ENV_MENU_ENDPOINT));
        }
        Ok(())
    }

    /// Directory holding `visual.onnx` for the configured model.
    pub fn model_dir(&self) -> Option<PathBuf> {
        self.embedding.model_path.clone().or_else(|| {
            Self::models_dir().map(|dir| dir.join(self.embedding.model_id.replace('/', "--")))
        })
    }

    /// Copy safe to print: the API key is masked.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if let Some(ref key) = config.pinecone.api_key {
            let tail: String = key
                .chars()
                .rev()
                .take(4)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            config.pinecone.api_key = Some(format!("****{}", tail));
        }
        config
    }

    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path().ok_or_else(|| {
            ConfigError::PathError("could not determine config directory".to_string())
        })?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn missing(key: &str) -> ConfigError {
    ConfigError::ValidationError(format!("{} is not set", key))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// GraphQL endpoint serving `menus { id name description imageUrl }`.
    #[serde(default)]
    pub endpoint: String,

    /// Request timeout. Unset leaves the HTTP client's default (none).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout_secs: None,
        }
    }
}

/// Compute device preference for the image model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// CUDA when available, CPU otherwise
    #[default]
    Auto,
    Cpu,
    Cuda,
}

impl std::str::FromStr for DeviceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(DeviceKind::Auto),
            "cpu" => Ok(DeviceKind::Cpu),
            "cuda" | "gpu" => Ok(DeviceKind::Cuda),
            _ => Err(format!("unknown device: {}", s)),
        }
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceKind::Auto => write!(f, "auto"),
            DeviceKind::Cpu => write!(f, "cpu"),
            DeviceKind::Cuda => write!(f, "cuda"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_model_id")]
    pub model_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,

    #[serde(default = "default_dimension")]
    pub dimension: u32,

    #[serde(default = "default_image_size")]
    pub image_size: u32,

    #[serde(default)]
    pub device: DeviceKind,

    /// Request timeout. Unset leaves the HTTP client's default (none).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}

fn default_dimension() -> u32 {
    DEFAULT_EMBEDDING_DIMENSION
}

fn default_image_size() -> u32 {
    DEFAULT_IMAGE_SIZE
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            model_path: None,
            dimension: default_dimension(),
            image_size: default_image_size(),
            device: DeviceKind::default(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PineconeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default)]
    pub index: String,

    /// Data-plane host. Resolved through the control plane when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default = "default_control_plane_url")]
    pub control_plane_url: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Request timeout. Unset leaves the HTTP client's default (none).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_control_plane_url() -> String {
    DEFAULT_CONTROL_PLANE_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_PINECONE_API_VERSION.to_string()
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            index: String::new(),
            host: None,
            control_plane_url: default_control_plane_url(),
            api_version: default_api_version(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}
