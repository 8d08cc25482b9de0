use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::infer::InferOptions;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "TABLE_EXPLORER_CONFIG";

/// Config file looked up in the working directory when the variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "table-explorer.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub inference: InferOptions,
    /// File opened on startup when no path is given on the command line.
    pub default_file: Option<PathBuf>,
    /// Worksheet name used for XLSX exports.
    pub sheet_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            inference: InferOptions::default(),
            default_file: None,
            sheet_name: "Filtered Data".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// `$TABLE_EXPLORER_CONFIG`, else `./table-explorer.json` if it exists,
    /// else defaults.
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_path(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_path(local);
        }
        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"inference": {"max_categories": 50}}"#).unwrap();
        assert_eq!(config.inference.max_categories, 50);
        assert_eq!(config.inference.categorical_ratio, 0.5);
        assert_eq!(config.sheet_name, "Filtered Data");
        assert!(config.default_file.is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<AppConfig>(r#"{"theme": "dark"}"#).is_err());
    }
}
