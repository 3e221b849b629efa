//! Engine configuration.
//!
//! Handles loading, validating, and merging a `config.toml`. User values are
//! layered on top of the stock defaults, so a config file only needs the keys
//! it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [session]
//! idle_ttl_secs = 0             # 0 = keep sessions for the process lifetime
//!
//! [limits]
//! max_upload_bytes = 20971520   # Reject uploads larger than this (20 MiB)
//! max_pixels = 50000000         # Reject images whose width*height exceeds this
//!
//! [processing]
//! max_threads = 4               # Filter worker threads (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::DecodeLimits;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Engine configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StylerConfig {
    /// Session lifetime policy.
    pub session: SessionConfig,
    /// Upload guards applied before an image reaches a session.
    pub limits: LimitsConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl StylerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_upload_bytes == 0 {
            return Err(ConfigError::Validation(
                "limits.max_upload_bytes must be greater than 0".into(),
            ));
        }
        if self.limits.max_pixels == 0 {
            return Err(ConfigError::Validation(
                "limits.max_pixels must be greater than 0".into(),
            ));
        }
        if self.processing.max_threads == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_threads must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn decode_limits(&self) -> DecodeLimits {
        DecodeLimits {
            max_bytes: self.limits.max_upload_bytes,
            max_pixels: self.limits.max_pixels,
        }
    }

    /// Idle eviction threshold, or `None` when eviction is disabled.
    pub fn idle_ttl(&self) -> Option<Duration> {
        match self.session.idle_ttl_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

/// Session lifetime settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Seconds since the last upload or preference change after which a
    /// session may be evicted. 0 disables eviction.
    pub idle_ttl_secs: u64,
}

/// Upload guards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    pub max_upload_bytes: usize,
    pub max_pixels: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        let limits = DecodeLimits::default();
        Self {
            max_upload_bytes: limits.max_bytes,
            max_pixels: limits.max_pixels,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of filter worker threads.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_threads.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(StylerConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<StylerConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: StylerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, or the stock defaults when `path` is `None`.
///
/// An explicitly named file that does not exist is an error.
pub fn load_config(path: Option<&Path>) -> Result<StylerConfig, ConfigError> {
    let overlay = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str::<toml::Value>(&content)?)
        }
        None => None,
    };
    resolve_config(overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# image-styler configuration
# ==========================
#
# All keys are optional. Values shown are the defaults.
# Unknown keys are rejected.

[session]
# Seconds after the last upload or quality change before a user's session
# may be evicted. 0 keeps sessions for the lifetime of the process.
idle_ttl_secs = 0

[limits]
# Uploads larger than this many bytes are rejected before decoding.
max_upload_bytes = 20971520
# Images whose width * height exceeds this are rejected before decoding pixels.
max_pixels = 50000000

[processing]
# Worker threads for filter work. Omit to use every CPU core.
# Larger values are clamped to the core count.
# max_threads = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = StylerConfig::default();
        assert_eq!(config.session.idle_ttl_secs, 0);
        assert_eq!(config.limits.max_upload_bytes, 20 * 1024 * 1024);
        assert_eq!(config.limits.max_pixels, 50_000_000);
        assert_eq!(config.processing.max_threads, None);
    }

    #[test]
    fn default_config_passes_validation() {
        StylerConfig::default().validate().unwrap();
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[limits]
max_pixels = 1000
"#;
        let config: StylerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.limits.max_pixels, 1000);
        assert_eq!(config.limits.max_upload_bytes, 20 * 1024 * 1024);
        assert_eq!(config.session.idle_ttl_secs, 0);
    }

    #[test]
    fn idle_ttl_zero_disables_eviction() {
        let config = StylerConfig::default();
        assert_eq!(config.idle_ttl(), None);

        let mut config = StylerConfig::default();
        config.session.idle_ttl_secs = 90;
        assert_eq!(config.idle_ttl(), Some(Duration::from_secs(90)));
    }

    #[test]
    fn decode_limits_mirror_config() {
        let mut config = StylerConfig::default();
        config.limits.max_upload_bytes = 123;
        config.limits.max_pixels = 456;
        assert_eq!(
            config.decode_limits(),
            DecodeLimits {
                max_bytes: 123,
                max_pixels: 456
            }
        );
    }

    #[test]
    fn unknown_key_rejected() {
        let toml = r#"
[session]
idle_ttl = 5
"#;
        let result: Result<StylerConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<StylerConfig, _> = toml::from_str("[styles]\nghibli = true\n");
        assert!(result.is_err());
    }

    #[test]
    fn validate_zero_upload_limit() {
        let mut config = StylerConfig::default();
        config.limits.max_upload_bytes = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_zero_pixel_limit() {
        let mut config = StylerConfig::default();
        config.limits.max_pixels = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_zero_threads() {
        let mut config = StylerConfig::default();
        config.processing.max_threads = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn effective_threads_auto() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let config = ProcessingConfig {
            max_threads: Some(cores + 64),
        };
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_threads: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value =
            toml::from_str("[limits]\nmax_pixels = 1\nmax_upload_bytes = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[limits]\nmax_pixels = 9\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["limits"]["max_pixels"].as_integer(), Some(9));
        assert_eq!(merged["limits"]["max_upload_bytes"].as_integer(), Some(2));
    }

    #[test]
    fn load_config_without_path_is_default() {
        let config = load_config(None).unwrap();
        assert_eq!(config.limits.max_pixels, 50_000_000);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[session]
idle_ttl_secs = 600

[processing]
max_threads = 2
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.idle_ttl(), Some(Duration::from_secs(600)));
        assert_eq!(config.processing.max_threads, Some(2));
        assert_eq!(config.limits.max_pixels, 50_000_000);
    }

    #[test]
    fn load_config_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(Some(&tmp.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[limits\nmax_pixels = ").unwrap();
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[limits]\nmax_pixels = 0\n").unwrap();
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: StylerConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = StylerConfig::default();
        assert_eq!(config.session.idle_ttl_secs, defaults.session.idle_ttl_secs);
        assert_eq!(config.limits.max_upload_bytes, defaults.limits.max_upload_bytes);
        assert_eq!(config.limits.max_pixels, defaults.limits.max_pixels);
        assert_eq!(config.processing.max_threads, defaults.processing.max_threads);
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let value = stock_defaults_value().unwrap();
        let table = value.as_table().unwrap();
        for section in ["session", "limits", "processing"] {
            assert!(table.contains_key(section), "missing [{section}]");
        }
    }
}
