use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

pub const API_KEY_VAR: &str = "OMDB_APIKEY";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Configuration {
    #[serde(default)]
    pub omdb: OmdbConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OmdbConfig {
    #[serde(rename = "baseUrl", default = "default_base_url")]
    pub base_url: String,
    #[serde(rename = "apikey")]
    pub api_key: Option<String>,
    #[serde(rename = "requestDelayMs", default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryConfig {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_base_url() -> String {
    "https://www.omdbapi.com/".to_string()
}

fn default_request_delay_ms() -> u64 {
    100
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("catalog.json")
}

fn default_limit() -> usize {
    5
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            request_delay_ms: default_request_delay_ms(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
        }
    }
}

impl Configuration {
    /// Loads the configuration, falling back to defaults when the file does
    /// not exist.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: Configuration = serde_yaml::from_str(content)?;
        Url::parse(&config.omdb.base_url)
            .with_context(|| format!("invalid OMDb base URL: {}", config.omdb.base_url))?;
        Ok(config)
    }
}

impl OmdbConfig {
    pub fn api_key(&self) -> anyhow::Result<String> {
        match &self.api_key {
            Some(key) => Ok(key.clone()),
            None => std::env::var(API_KEY_VAR)
                .with_context(|| format!("no OMDb API key configured and {API_KEY_VAR} is unset")),
        }
    }
}
