//! Global loader configuration
//!
//! Supplied once per page by the host as a JSON object:
//!
//! ```json
//! { "core_script_url": "...", "ui_script_url": "...", "debug": 1 }
//! ```

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::error::{SettingError, SettingResult};

/// Default engine core script
pub const DEFAULT_CORE_SCRIPT_URL: &str = "https://cdn.jsdelivr.net/npm/3dmol/build/3Dmol-min.js";
/// Default engine UI extension script
pub const DEFAULT_UI_SCRIPT_URL: &str = "https://cdn.jsdelivr.net/npm/3dmol/build/3Dmol.ui-min.js";

fn default_core_script_url() -> String {
    DEFAULT_CORE_SCRIPT_URL.to_string()
}

fn default_ui_script_url() -> String {
    DEFAULT_UI_SCRIPT_URL.to_string()
}

/// Page-wide configuration for the loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Engine core script URL
    #[serde(default = "default_core_script_url", alias = "core")]
    pub core_script_url: String,

    /// Engine UI extension script URL, only loaded when a mount wants controls
    #[serde(default = "default_ui_script_url", alias = "ui")]
    pub ui_script_url: String,

    /// Verbose diagnostics
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub debug: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            core_script_url: default_core_script_url(),
            ui_script_url: default_ui_script_url(),
            debug: false,
        }
    }
}

impl LoaderConfig {
    /// Parse from the host's JSON configuration object
    pub fn from_json(raw: &str) -> SettingResult<Self> {
        serde_json::from_str(raw).map_err(|e| SettingError::Deserialization(e.to_string()))
    }

    /// Most verbose level that should be emitted
    ///
    /// Warnings and errors are always on; info and debug traces need the
    /// debug flag.
    pub fn max_log_level(&self) -> LevelFilter {
        if self.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        }
    }
}

/// Accept `true`/`false`, `0`/`1` and their string forms
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrInt {
        Bool(bool),
        Int(i64),
        Str(String),
    }

    match BoolOrInt::deserialize(deserializer)? {
        BoolOrInt::Bool(b) => Ok(b),
        BoolOrInt::Int(i) => Ok(i != 0),
        BoolOrInt::Str(s) => Ok(matches!(s.trim(), "1" | "true" | "yes")),
    }
}
