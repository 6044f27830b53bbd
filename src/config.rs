//! Run configuration.
//!
//! Handles loading, validating, and merging the optional `photo-ingest.toml`
//! file. Stock defaults are the base layer; the file overrides them; CLI flags
//! override the file. The result is one [`IngestConfig`] value built at
//! startup and passed into the orchestrator.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! input_dir = "input-images"            # Author folders live here
//! output_dir = "output"                 # Converted JPEGs (created if absent)
//! ledger_path = "processed_files.json"  # Processed-file ledger
//!
//! [jpeg]
//! quality = 95                          # 1-100
//! background = [255, 255, 255]          # Fill under transparent pixels
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::imaging::{Background, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "photo-ingest.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Everything a run needs to know, resolved once at startup.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    /// Root of the author-folder tree.
    pub input_dir: PathBuf,
    /// Where converted JPEGs are written.
    pub output_dir: PathBuf,
    /// JSON ledger of processed files.
    pub ledger_path: PathBuf,
    /// Output encoding settings.
    pub jpeg: JpegConfig,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input-images"),
            output_dir: PathBuf::from("output"),
            ledger_path: PathBuf::from("processed_files.json"),
            jpeg: JpegConfig::default(),
        }
    }
}

impl IngestConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.jpeg.quality) {
            return Err(ConfigError::Validation(
                "jpeg.quality must be 1-100".into(),
            ));
        }
        if self.input_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation("input_dir must not be empty".into()));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "output_dir must not be empty".into(),
            ));
        }
        if self.ledger_path.file_name().is_none() {
            return Err(ConfigError::Validation(
                "ledger_path must name a file".into(),
            ));
        }
        Ok(())
    }

    /// Replace paths with any values given on the command line.
    pub fn with_overrides(
        mut self,
        input_dir: Option<PathBuf>,
        output_dir: Option<PathBuf>,
        ledger_path: Option<PathBuf>,
    ) -> Self {
        if let Some(p) = input_dir {
            self.input_dir = p;
        }
        if let Some(p) = output_dir {
            self.output_dir = p;
        }
        if let Some(p) = ledger_path {
            self.ledger_path = p;
        }
        self
    }
}

/// JPEG output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JpegConfig {
    /// Encoding quality (1 = worst, 100 = best).
    pub quality: u32,
    /// `[r, g, b]` fill composited under transparent pixels.
    pub background: Background,
}

impl Default for JpegConfig {
    fn default() -> Self {
        Self {
            quality: 95,
            background: Background::WHITE,
        }
    }
}

impl JpegConfig {
    pub fn quality(&self) -> Quality {
        Quality::new(self.quality.min(100) as u8)
    }
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(IngestConfig::default()).expect("default config must serialize")
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

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<IngestConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: IngestConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults if it is absent.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: &Path) -> Result<IngestConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Like [`load_config`], but the file must exist.
pub fn load_required_config(path: &Path) -> Result<IngestConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    load_config(path)
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# photo-ingest configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags (--input, --output, --ledger) override these values.
# Unknown keys will cause an error.

# Root of the input tree. Each immediate subfolder is an author; files placed
# directly in this folder have no author and are not converted.
input_dir = "input-images"

# Where converted JPEGs are written. Created if it does not exist.
output_dir = "output"

# JSON ledger mapping input paths to content hashes. Files whose content is
# already recorded here are skipped on later runs.
ledger_path = "processed_files.json"

# ---------------------------------------------------------------------------
# JPEG output
# ---------------------------------------------------------------------------
[jpeg]
# Encoding quality (1 = worst, 100 = best).
quality = 95

# Colour transparent pixels are flattened onto, as [r, g, b].
background = [255, 255, 255]
"##
}
