//! Configuration loading from files and the environment

use crate::{AppConfig, ConfigError, Result};
use config::{Config, Environment, File, FileFormat};
use std::path::Path;

/// Default environment-variable prefix. Sections are separated with a double
/// underscore, e.g. `CIPHER_DCA_ENGINE__K_TARGET=25`.
pub const ENV_PREFIX: &str = "CIPHER_DCA";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a file; format is chosen by extension.
    pub fn from_file(path: &Path) -> Result<AppConfig> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::LoadError("No file extension found".to_string()))?;

        let content = std::fs::read_to_string(path)?;

        match extension {
            "toml" => Self::from_toml(&content),
            "json" => Self::from_json(&content),
            _ => Err(ConfigError::LoadError(format!(
                "Unsupported file extension: {}",
                extension
            ))),
        }
    }

    pub fn from_toml(content: &str) -> Result<AppConfig> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    pub fn from_json(content: &str) -> Result<AppConfig> {
        serde_json::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration from a file with `CIPHER_DCA_*` environment
    /// overrides layered on top.
    pub fn from_file_with_env(path: &Path) -> Result<AppConfig> {
        let format = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => FileFormat::Json,
            _ => FileFormat::Toml,
        };

        let config = Config::builder()
            .add_source(File::from(path).format(format))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize().map_err(ConfigError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AdapterVariant;
    use std::io::Write;

    const SAMPLE: &str = r#"
log_level = "debug"

[engine]
admin = "ops"
account = "batcher"
base_denom = "weth"
k_target = 4

[adapter]
variant = "mock"
router = "mock-router"
quote_denom = "usdc"
base_denom = "weth"

[relayer]
identity = "fhe-relayer"
"#;

    #[test]
    fn loads_toml_with_defaults() {
        let config = ConfigLoader::from_toml(SAMPLE).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.engine.admin, "ops");
        assert_eq!(config.engine.k_target, 4);
        // defaulted fields
        assert_eq!(config.engine.dt_seconds, 3_600);
        assert_eq!(config.adapter.fee_tier, 3_000);
        assert_eq!(config.adapter.variant, AdapterVariant::Mock);
        assert_eq!(config.relayer.max_attempts, 5);
    }

    #[test]
    fn loads_from_file_by_extension() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = ConfigLoader::from_file(file.path()).unwrap();
        assert_eq!(config.engine.admin, "ops");
    }

    #[test]
    fn rejects_unknown_extension() {
        let mut file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        file.write_all(b"x = 1").unwrap();
        assert!(matches!(
            ConfigLoader::from_file(file.path()),
            Err(ConfigError::LoadError(_))
        ));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            ConfigLoader::from_toml("engine = \"not a table\""),
            Err(ConfigError::TomlError(_))
        ));
    }
}
