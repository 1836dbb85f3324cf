//! Configuration module
//!
//! Reads `config.toml` (default: `~/.config/meter-billing/config.toml`).
//! Every section is optional; missing values fall back to the defaults below.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [logging]
//! level = "info"
//! format = "pretty"   # or "json"
//!
//! [tariffs]
//! currency_symbol = "Rs"
//!
//! [tariffs.electricity]
//! fixed_charge = 100
//! gst_rate = 0.17
//! income_tax_rate = 0.075
//! income_tax_threshold = 200
//! slabs = [
//!     { units = 50, rate = 16.48 },
//!     { rate = 35.24 },
//! ]
//!
//! [tariffs.gas]
//! rate = 15
//! unit = "unit"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::TariffSchedules;
use crate::shared::errors::ConfigError;

/// Directory name under the user's config dir.
pub const APP_DIR: &str = "meter-billing";

/// Default config file location
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds allowed for in-flight requests after a shutdown signal
    pub shutdown_timeout: u64,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. "info" or "meter_billing=debug"
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Where the running configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    File,
    /// No config file at the given path
    Defaults,
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub tariffs: TariffSchedules,
}

impl AppConfig {
    /// Load and validate the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&raw).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, falling back to the defaults only when the file does
    /// not exist. Unreadable, malformed or invalid files are errors.
    pub fn load_or_default(path: &Path) -> Result<(Self, ConfigSource), ConfigError> {
        match Self::load(path) {
            Ok(config) => Ok((config, ConfigSource::File)),
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok((Self::default(), ConfigSource::Defaults))
            }
            Err(e) => Err(e),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.logging.format.to_lowercase().as_str() {
            "pretty" | "json" => {}
            other => return Err(ConfigError::LogFormat(other.to_string())),
        }
        self.tariffs.validate()?;
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TariffConfigError;
    use rust_decimal::Decimal;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.tariffs, TariffSchedules::default());
    }

    #[test]
    fn partial_sections_override_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [server]
            port = 9100

            [logging]
            format = "json"

            [tariffs.water]
            rate = 0.5
            unit = "liter"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.logging.format, "json");
        assert_eq!(cfg.tariffs.water.rate, Decimal::new(5, 1));
        assert_eq!(cfg.server.address(), "0.0.0.0:9100");
    }

    #[test]
    fn invalid_tariffs_are_rejected() {
        let err = AppConfig::from_toml(
            r#"
            [tariffs.electricity]
            slabs = [{ units = 50, rate = 16.48 }]
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Tariff(TariffConfigError::LastSlabBounded)
        ));
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let err = AppConfig::from_toml("[logging]\nformat = \"xml\"").unwrap_err();
        assert!(matches!(err, ConfigError::LogFormat(f) if f == "xml"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = AppConfig::from_toml("[server\nport = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = AppConfig::load(Path::new("/nonexistent/meter-billing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    fn write_temp(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("meter-billing-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let (cfg, source) =
            AppConfig::load_or_default(Path::new("/nonexistent/meter-billing.toml")).unwrap();
        assert_eq!(source, ConfigSource::Defaults);
        assert_eq!(cfg.tariffs, TariffSchedules::default());
    }

    #[test]
    fn existing_file_is_loaded() {
        let path = write_temp("[server]\nport = 9200\n");
        let (cfg, source) = AppConfig::load_or_default(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(source, ConfigSource::File);
        assert_eq!(cfg.server.port, 9200);
    }

    #[test]
    fn invalid_tariff_file_does_not_fall_back() {
        let path = write_temp("[tariffs.electricity]\nslabs = [{ units = 50, rate = 16.48 }]\n");
        let err = AppConfig::load_or_default(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(
            err,
            ConfigError::Tariff(TariffConfigError::LastSlabBounded)
        ));
    }

    #[test]
    fn malformed_file_does_not_fall_back() {
        let path = write_temp("[server\nport = 1");
        let err = AppConfig::load_or_default(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, ConfigError::Parse { path: ref p, .. } if *p == path));
    }

    #[test]
    fn unreadable_path_does_not_fall_back() {
        let dir = std::env::temp_dir();
        let err = AppConfig::load_or_default(&dir).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn default_path_ends_with_app_dir() {
        let path = default_config_path();
        assert!(path.ends_with("meter-billing/config.toml"));
    }
}
