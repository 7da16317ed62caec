use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::registry::manager::{RegistryConfig, DEFAULT_EXTENSION};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub extension: String,
    pub max_upload_size_mb: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub log_requests: bool,
    pub format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            extension: DEFAULT_EXTENSION.to_string(),
            max_upload_size_mb: 16,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_requests: true,
            format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Defaults, then `config.toml` if present, then `APP_*` environment
    /// variables (`APP_SERVER__PORT=8080`, `APP_STORAGE__UPLOAD_DIR=/srv/books`).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    pub fn load_from(file_name: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name(file_name).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let app_config: AppConfig = builder.build()?.try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port cannot be 0".to_string()));
        }

        if self.storage.extension.len() < 2 || !self.storage.extension.starts_with('.') {
            return Err(ConfigError::Message(format!(
                "Document extension must start with a dot, got {:?}",
                self.storage.extension
            )));
        }

        if self.storage.max_upload_size_mb == 0 {
            return Err(ConfigError::Message(
                "Max upload size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn create_directories(&self) -> Result<(), std::io::Error> {
        std::fs::create_dir_all(&self.storage.upload_dir)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.storage.max_upload_size_mb * 1024 * 1024
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            upload_dir: self.storage.upload_dir.clone(),
            extension: self.storage.extension.to_lowercase(),
            max_upload_bytes: self.max_upload_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.storage.extension, ".mobi");
        assert_eq!(config.max_upload_bytes(), 16 * 1024 * 1024);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.storage.extension = "mobi".to_string();
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.storage.extension = ".".to_string();
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.storage.max_upload_size_mb = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bind_address() {
        let mut config = AppConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:5000");

        config.server.host = "127.0.0.1".to_string();
        config.server.port = 8080;
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_registry_config() {
        let mut config = AppConfig::default();
        config.storage.extension = ".MOBI".to_string();
        config.storage.max_upload_size_mb = 2;

        let registry_config = config.registry_config();
        assert_eq!(registry_config.extension, ".mobi");
        assert_eq!(registry_config.max_upload_bytes, 2 * 1024 * 1024);
        assert_eq!(registry_config.upload_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("shelf.toml");
        std::fs::write(
            &path,
            r#"
            [server]
            port = 8088

            [storage]
            upload_dir = "/srv/books"
            max_upload_size_mb = 4

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        let name = path.with_extension("");
        let config = AppConfig::load_from(name.to_str().unwrap()).expect("Should load file configuration");

        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.upload_dir, PathBuf::from("/srv/books"));
        assert_eq!(config.storage.extension, ".mobi");
        assert_eq!(config.max_upload_bytes(), 4 * 1024 * 1024);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        std::fs::write(&path, "[storage]\nmax_upload_size_mb = 0\n").unwrap();

        let name = path.with_extension("");
        assert!(AppConfig::load_from(name.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_directory_creation() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.storage.upload_dir = temp_dir.path().join("uploads");

        assert!(config.create_directories().is_ok());
        assert!(config.storage.upload_dir.exists());
    }
}
