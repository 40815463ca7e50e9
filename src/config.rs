// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::codec::CodecOptions;
use crate::error::{Result, StoreError};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Longest `%g` precision that still carries information for an f64.
pub const MAX_FLOAT_PRECISION: usize = 17;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub codec: CodecConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Host directory standing in for the mounted flash partition.
    pub root: PathBuf,
    pub capacity_bytes: u64,
    pub chip_size_bytes: u64,
    pub configured_size_bytes: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CodecConfig {
    /// `None` selects shortest round-trip notation.
    pub float_precision: Option<usize>,
    pub char_buffer_size: usize,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub color: bool,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("FLASH_PERSIST")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| StoreError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| StoreError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            storage: StorageConfig {
                root: PathBuf::from("./flash"),
                capacity_bytes: 1024 * 1024,
                chip_size_bytes: 4 * 1024 * 1024,
                configured_size_bytes: 4 * 1024 * 1024,
            },
            codec: CodecConfig {
                float_precision: Some(15),
                char_buffer_size: 1024,
            },
            logging: LoggingConfig::default(),
        }
    }

    pub fn codec_options(&self) -> CodecOptions {
        CodecOptions {
            float_precision: self.codec.float_precision,
            char_buffer_size: self.codec.char_buffer_size,
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(precision) = self.codec.float_precision {
            if precision == 0 || precision > MAX_FLOAT_PRECISION {
                return Err(StoreError::Config(format!(
                    "float_precision must be between 1 and {}",
                    MAX_FLOAT_PRECISION
                )));
            }
        }

        if self.codec.char_buffer_size == 0 {
            return Err(StoreError::Config(
                "char_buffer_size must be greater than 0".to_string(),
            ));
        }

        if self.storage.capacity_bytes == 0 {
            return Err(StoreError::Config(
                "capacity_bytes must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.codec_options(), CodecOptions::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            r#"
[storage]
root = "/tmp/flash"
capacity_bytes = 2048
chip_size_bytes = 4096
configured_size_bytes = 4096

[codec]
float_precision = 6
char_buffer_size = 64
"#,
        )
        .unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.storage.capacity_bytes, 2048);
        assert_eq!(config.codec.float_precision, Some(6));
        assert_eq!(config.codec.char_buffer_size, 64);
        assert!(!config.logging.verbose);
    }

    #[test]
    fn test_rejects_bad_precision() {
        let mut config = Config::default_config();
        config.codec.float_precision = Some(0);
        assert!(config.validate().is_err());
        config.codec.float_precision = Some(18);
        assert!(config.validate().is_err());
        config.codec.float_precision = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_buffer() {
        let mut config = Config::default_config();
        config.codec.char_buffer_size = 0;
        assert!(matches!(config.validate(), Err(StoreError::Config(_))));
    }
}
