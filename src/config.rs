use serde::Deserialize;
use std::path::PathBuf;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory holding the catalog and interaction files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Users CSV, relative to `data_dir`
    #[serde(default = "default_users_file")]
    pub users_file: String,

    /// Products CSV, relative to `data_dir`
    #[serde(default = "default_products_file")]
    pub products_file: String,

    /// Interactions JSON, relative to `data_dir`
    #[serde(default = "default_interactions_file")]
    pub interactions_file: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Recommendation list length when a request does not give one
    #[serde(default = "default_top_n")]
    pub default_top_n: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_users_file() -> String {
    "user_personalized_features.csv".to_string()
}

fn default_products_file() -> String {
    "products.csv".to_string()
}

fn default_interactions_file() -> String {
    "user_interactions.json".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_top_n() -> usize {
    5
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join(&self.users_file)
    }

    pub fn products_path(&self) -> PathBuf {
        self.data_dir.join(&self.products_file)
    }

    pub fn interactions_path(&self) -> PathBuf {
        self.data_dir.join(&self.interactions_file)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
