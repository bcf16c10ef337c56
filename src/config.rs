//! Configuration management for Bookshelf server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::models::SchemaProfile;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Store engine behind the `BookStore` interface
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Postgres,
    Sqlite,
}

impl DatabaseBackend {
    /// Infer the backend from a connection URL scheme
    pub fn from_url(url: &str) -> Option<Self> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Some(DatabaseBackend::Postgres)
        } else if url.starts_with("sqlite:") {
            Some(DatabaseBackend::Sqlite)
        } else {
            None
        }
    }

    pub fn default_schema(self) -> SchemaProfile {
        match self {
            DatabaseBackend::Postgres => SchemaProfile::Basic,
            DatabaseBackend::Sqlite => SchemaProfile::Published,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    /// Explicit backend; inferred from `url` when absent
    pub backend: Option<DatabaseBackend>,
    /// Table layout; defaults per backend when absent
    pub schema: Option<SchemaProfile>,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Author names inserted at startup when the authors table is empty
    pub seed_authors: Vec<String>,
}

impl DatabaseConfig {
    pub fn backend(&self) -> Result<DatabaseBackend, ConfigError> {
        self.backend
            .or_else(|| DatabaseBackend::from_url(&self.url))
            .ok_or_else(|| {
                ConfigError::Message(format!(
                    "Cannot infer database backend from url '{}'",
                    self.url
                ))
            })
    }

    pub fn schema(&self) -> Result<SchemaProfile, ConfigError> {
        match self.schema {
            Some(schema) => Ok(schema),
            None => Ok(self.backend()?.default_schema()),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // e.g. BOOKSHELF__SERVER__PORT=9000
            .add_source(
                Environment::with_prefix("BOOKSHELF")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://database.db".to_string(),
            backend: None,
            schema: None,
            max_connections: 10,
            min_connections: 1,
            seed_authors: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
