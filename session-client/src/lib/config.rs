use std::env;
use std::path::PathBuf;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::guard::models::GuardSettings;
use crate::domain::guard::models::ProtectedRoute;
use crate::domain::guard::models::RouteTable;
use crate::outbound::http::MediatorSettings;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub auth_api: AuthApiConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub guard: GuardSettings,
    #[serde(default)]
    pub mediator: MediatorSettings,
    #[serde(default)]
    pub routes: Vec<ProtectedRoute>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub path: PathBuf,
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (AUTH_API__BASE_URL, STORAGE__PATH, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: AUTH_API__BASE_URL=http://... overrides auth_api.base_url
            .add_source(Environment::default().separator("__"))
            .build()?;

        configuration.try_deserialize()
    }

    /// Protected destinations declared in configuration.
    pub fn route_table(&self) -> RouteTable {
        self.routes.iter().collect()
    }
}
