//! Configuration and defaults for diagnostics.
//!
//! The defaults below are the only process-wide values; components take a
//! `DiagConfig` at construction and never read globals after that.

use crate::utils::error::ConfigError;
use chrono::{DateTime, Local};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use std::fs;
use std::path::Path;

/// Default number of frames rendered in a call sequence
pub const DEFAULT_CALLER_DEPTH: usize = 3;

/// Default timestamp pattern (chrono strftime vocabulary)
/// e.g. `14:03:22.123456`
pub const DEFAULT_DATETIME_FORMAT: &str = "%H:%M:%S%.6f";

/// Default end-of-line marker for emitted lines
pub const DEFAULT_LINE_END: &str = "\n";

/// Separator between rendered call sequence entries
pub const CHAIN_SEPARATOR: &str = " -> ";

/// Diagnostics configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DiagConfig {
    /// Frames rendered when the caller does not ask for a depth
    #[serde(default = "default_caller_depth")]
    pub caller_depth: usize,

    /// Timestamp pattern used by the emitter
    #[serde(default = "default_datetime_format")]
    pub datetime_format: String,

    /// Terminator written after each emitted line
    #[serde(default = "default_line_end")]
    pub line_end: String,
}

fn default_caller_depth() -> usize {
    DEFAULT_CALLER_DEPTH
}

fn default_datetime_format() -> String {
    DEFAULT_DATETIME_FORMAT.to_string()
}

fn default_line_end() -> String {
    DEFAULT_LINE_END.to_string()
}

impl Default for DiagConfig {
    fn default() -> Self {
        Self {
            caller_depth: DEFAULT_CALLER_DEPTH,
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            line_end: DEFAULT_LINE_END.to_string(),
        }
    }
}

impl DiagConfig {
    /// Set the default caller depth
    pub fn with_caller_depth(mut self, depth: usize) -> Self {
        self.caller_depth = depth;
        self
    }

    /// Set the timestamp pattern
    pub fn with_datetime_format(mut self, format: impl Into<String>) -> Self {
        self.datetime_format = format.into();
        self
    }

    /// Set the line terminator
    pub fn with_line_end(mut self, end: impl Into<String>) -> Self {
        self.line_end = end.into();
        self
    }

    /// Check the config before handing it to components
    ///
    /// # Errors
    /// * `ConfigError::InvalidDepth` - `caller_depth` is zero
    /// * `ConfigError::InvalidDateTimeFormat` - chrono cannot format with the pattern
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.caller_depth == 0 {
            return Err(ConfigError::InvalidDepth);
        }
        if !is_valid_datetime_format(&self.datetime_format) {
            return Err(ConfigError::InvalidDateTimeFormat(
                self.datetime_format.clone(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a config from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: DiagConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a config from JSON text
    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let config: DiagConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }
}

/// Load a config file
///
/// Files ending in `.json` are read as JSON, everything else as TOML.
///
/// # Errors
/// * `ConfigError::Io` - If file cannot be read
/// * `ConfigError::Toml` / `ConfigError::Json` - If the contents do not parse
/// * Any `validate` error
///
/// # Example
/// ```ignore
/// let config = load_config("diag.toml")?;
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<DiagConfig, ConfigError> {
    let path = path.as_ref();
    debug!("Reading diagnostics config from: {}", path.display());

    let contents = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let config = if is_json {
        DiagConfig::from_json_str(&contents)?
    } else {
        DiagConfig::from_toml_str(&contents)?
    };

    info!(
        "Loaded diagnostics config (depth {}, format {:?})",
        config.caller_depth, config.datetime_format
    );
    Ok(config)
}

/// Render `time` with a strftime pattern
///
/// # Errors
/// `fmt::Error` when chrono cannot format the pattern: unknown or
/// dangling specifiers, and parse-only ones such as `%#z`.
pub fn format_datetime(time: &DateTime<Local>, format: &str) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write!(out, "{}", time.format(format))?;
    Ok(out)
}

/// True when chrono can format a timestamp with `format`
pub fn is_valid_datetime_format(format: &str) -> bool {
    format_datetime(&Local::now(), format).is_ok()
}
