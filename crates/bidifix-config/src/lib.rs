//! bidifix configuration
//!
//! This crate provides the configuration object the correction engine reads,
//! loading settings from `bidifix.toml` as an alternative to environment
//! variables. The engine itself never persists configuration; hosts load it
//! here and push updates into the engine at runtime.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Per-run rewrite policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixMode {
    /// Isolate every minority-script run against the block direction.
    Auto,
    /// Set block-level direction only; never rewrite runs.
    DirOnly,
    /// Isolate LTR runs only; RTL runs are left as plain text.
    WrapLatin,
}

impl FixMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FixMode::Auto => "auto",
            FixMode::DirOnly => "dir-only",
            FixMode::WrapLatin => "wrap-latin",
        }
    }
}

impl fmt::Display for FixMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FixMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(FixMode::Auto),
            "dir-only" => Ok(FixMode::DirOnly),
            "wrap-latin" => Ok(FixMode::WrapLatin),
            other => Err(format!(
                "Unknown mode '{}' (expected auto, dir-only or wrap-latin)",
                other
            )),
        }
    }
}

/// Main configuration structure for the correction engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BidiConfig {
    /// Master switch; when false the engine drops invalidations and runs
    /// no sweeps.
    pub enabled: bool,
    /// Per-run rewrite policy.
    pub mode: FixMode,
    /// Reserved skip toggle carried for hosts; the built-in skip set is
    /// applied unconditionally regardless of this value.
    pub skip_code: bool,
}

impl Default for BidiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: FixMode::Auto,
            skip_code: true,
        }
    }
}

/// A partial configuration pushed into a running engine.
///
/// Merge semantics: only the keys that are present change; everything else
/// keeps its current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigUpdate {
    pub enabled: Option<bool>,
    pub mode: Option<FixMode>,
    pub skip_code: Option<bool>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.enabled.is_none() && self.mode.is_none() && self.skip_code.is_none()
    }
}

impl BidiConfig {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the bidifix.toml configuration file
    ///
    /// # Returns
    /// * `Ok(BidiConfig)` - Successfully loaded configuration
    /// * `Err(String)` - Error message if loading failed
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Load configuration from the default location (bidifix.toml in the
    /// current directory) or return default configuration if file doesn't
    /// exist
    pub fn load_or_default() -> Self {
        Self::load_from_file("bidifix.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    /// This allows for temporary overrides without modifying the config file.
    pub fn merge_with_env(&mut self) {
        if let Ok(val) = std::env::var("BIDIFIX_ENABLED") {
            self.enabled = val == "1" || val.eq_ignore_ascii_case("true");
        }
        if let Ok(val) = std::env::var("BIDIFIX_MODE") {
            if let Ok(mode) = val.parse::<FixMode>() {
                self.mode = mode;
            }
        }
        if let Ok(val) = std::env::var("BIDIFIX_SKIP_CODE") {
            self.skip_code = val == "1" || val.eq_ignore_ascii_case("true");
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// This is the recommended way to load configuration:
    /// 1. Load from bidifix.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }

    /// Merge a partial update into this configuration.
    ///
    /// Returns true if any effective value changed, which is what callers
    /// use to decide whether processed state must be invalidated.
    pub fn apply_update(&mut self, update: &ConfigUpdate) -> bool {
        let before = self.clone();
        if let Some(enabled) = update.enabled {
            self.enabled = enabled;
        }
        if let Some(mode) = update.mode {
            self.mode = mode;
        }
        if let Some(skip_code) = update.skip_code {
            self.skip_code = skip_code;
        }
        *self != before
    }
}
