use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub storage: StorageConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage backend: "memory" or "sqlite".
    pub backend: String,

    /// SQLite connection string, used only by the sqlite backend.
    pub database_path: String,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            database_path: "sqlite:data/reelbase.db".to_string(),
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8080,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            storage: StorageConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::default_config_path();
        if path.exists() {
            info!("Loading config from: {}", path.display());
            return Self::load_from_path(&path);
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        match self.storage.backend.as_str() {
            "memory" | "sqlite" => {}
            other => anyhow::bail!("Unknown storage backend '{other}' (expected memory or sqlite)"),
        }

        if self.storage.backend == "sqlite" && self.storage.database_path.is_empty() {
            anyhow::bail!("database_path cannot be empty with the sqlite backend");
        }

        if self.server.enabled && self.server.port == 0 {
            anyhow::bail!("Server port must be non-zero when the server is enabled");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage.backend, "memory");
        assert_eq!(config.server.port, 8080);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[storage]"));
        assert!(toml_str.contains("[server]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [storage]
            backend = "sqlite"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.storage.backend, "sqlite");

        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let mut config = Config::default();
        config.storage.backend = "sqlite".to_string();

        let path = std::env::temp_dir().join("reelbase_config_test.toml");
        config.save_to_path(&path).unwrap();
        let reloaded = Config::load_from_path(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(reloaded.storage.backend, "sqlite");
        assert_eq!(reloaded.server.port, config.server.port);
    }

    #[test]
    fn test_validate_rejects_unknown_backend() {
        let mut config = Config::default();
        config.storage.backend = "postgres".to_string();
        assert!(config.validate().is_err());
    }
}
