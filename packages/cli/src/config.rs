use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use weft_binding::BindOptions;

pub const DEFAULT_CONFIG_NAME: &str = "weft.config.json";

/// Weft configuration file format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Repeater marker options
    #[serde(default)]
    pub bind: BindOptions,

    /// Data file used when `--data` is not given, relative to the config
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<String>,
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Absolute path of the default data file, if one is configured
    pub fn data_path(&self, cwd: &str) -> Option<PathBuf> {
        self.data_file
            .as_deref()
            .map(|file| Path::new(cwd).join(file))
    }
}
