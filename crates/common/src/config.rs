//! Application configuration.

use serde::Deserialize;
use std::path::PathBuf;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Upload storage configuration.
    #[serde(default)]
    pub uploads: UploadConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Upload storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Filesystem root of the public upload directory.
    #[serde(default = "default_upload_root")]
    pub root: PathBuf,
    /// URL path prefix under which uploads are served.
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
    /// Use second-resolution unix timestamps in generated file names
    /// instead of ULID tokens. Kept for bit-compatibility with data
    /// written by legacy deployments; same-second uploads of an
    /// identically named file overwrite each other.
    #[serde(default)]
    pub legacy_timestamp_names: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            root: default_upload_root(),
            public_prefix: default_public_prefix(),
            legacy_timestamp_names: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

fn default_upload_root() -> PathBuf {
    PathBuf::from("./public/assets/images/uploads")
}

fn default_public_prefix() -> String {
    "/assets/images/uploads".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `ARBOR_ENV`)
    /// 3. Environment variables with `ARBOR_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("ARBOR_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("ARBOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_defaults() {
        let uploads = UploadConfig::default();
        assert_eq!(uploads.public_prefix, "/assets/images/uploads");
        assert!(!uploads.legacy_timestamp_names);
    }
}
