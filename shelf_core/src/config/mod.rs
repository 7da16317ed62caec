pub mod settings;

pub use settings::{AppConfig, LogFormat, LoggingConfig, ServerConfig, StorageConfig};
