use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::attack::multi::MultiConfig;

/// Complete configuration for the Bletchley CLI. Parsed from TOML. All
/// sections are optional and used by different commands.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub multi: Option<MultiConfig>,
}

// a simple loader that reads the config from a file
impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}
