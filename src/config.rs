//! The config module holds the settings shared by every pipeline stage and
//! loads them from an optional JSON file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_EXCLUSIONS, DEFAULT_MAX_CANDIDATES, DEFAULT_SHOPPING_LIST, DEFAULT_TEMPERATURE,
    DEFAULT_TIMEOUT_MS,
};

/// Settings passed explicitly into each component.
///
/// Every field may be omitted from the JSON file, in which case the built-in
/// default is used.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Endpoint override for the text-generation backend.
    pub base_url: Option<String>,
    /// Sampling temperature for every text-generation call.
    pub temperature: f32,
    /// Ingredients containing any of these words are never bought.
    pub exclusions: Vec<String>,
    /// Shopping list used when no recipe is given or nothing could be extracted.
    pub default_shopping_list: Vec<String>,
    /// Maximum number of candidate products considered per search.
    pub max_candidates: usize,
    /// Deadline in milliseconds for each recipe fetch and model call.
    pub timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            temperature: DEFAULT_TEMPERATURE,
            exclusions: DEFAULT_EXCLUSIONS.iter().map(|&word| word.to_owned()).collect(),
            default_shopping_list: DEFAULT_SHOPPING_LIST
                .iter()
                .map(|&item| item.to_owned())
                .collect(),
            max_candidates: DEFAULT_MAX_CANDIDATES,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl Config {
    /// Reads a config from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid config JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_json(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parses a config from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid config JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The per-call deadline as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Loads the file at `path` if given, otherwise the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a path is given and loading it fails.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
