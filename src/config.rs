use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Which retrieval backend the inference adapter should use
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelBackend {
    /// Brute-force index artifact read from `MODEL_PATH`
    Index,
    /// TensorFlow-Serving style REST endpoint at `MODEL_SERVING_URL`
    Serving,
    /// No model at all; recommendations come from catalog sampling only
    None,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Flat catalog file (CSV with title, genre, rating, poster_path)
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    #[serde(default = "default_model_backend")]
    pub model_backend: ModelBackend,

    /// Exported retrieval index
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Model server base URL
    #[serde(default = "default_model_serving_url")]
    pub model_serving_url: String,

    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Input name used when the server rejects the positional calling convention
    #[serde(default = "default_model_input_key")]
    pub model_input_key: String,

    #[serde(default = "default_model_timeout_secs")]
    pub model_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("movies.csv")
}

fn default_model_backend() -> ModelBackend {
    ModelBackend::Index
}

fn default_model_path() -> PathBuf {
    PathBuf::from("my_model/index.json")
}

fn default_model_serving_url() -> String {
    "http://localhost:8501".to_string()
}

fn default_model_name() -> String {
    "my_model".to_string()
}

fn default_model_input_key() -> String {
    "input_1".to_string()
}

fn default_model_timeout_secs() -> u64 {
    5
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }
}
