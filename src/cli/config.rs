//! TOML configuration file support.
//!
//! Settings that would otherwise be passed as flags can live in a file;
//! explicit flags win over file values:
//!
//! ```toml
//! # orthoxml.toml
//! [filter]
//! score_name = "CompletenessScore"
//! threshold = 0.75
//! strategy = "bottomup"
//! min_hog_size = 2
//!
//! [output]
//! indent = 2
//! pipeline = 16
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Root configuration structure for orthoxml.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Filter-specific settings.
    #[serde(default)]
    pub filter: FilterSection,

    /// Output settings shared by all writing commands.
    #[serde(default)]
    pub output: OutputSection,
}

/// Configuration for the filter command.
#[derive(Debug, Default, Deserialize)]
pub struct FilterSection {
    /// Score id to test.
    pub score_name: Option<String>,

    /// Minimum accepted score value.
    pub threshold: Option<f64>,

    /// Strategy name.
    pub strategy: Option<String>,

    /// Minimum HOG size.
    pub min_hog_size: Option<usize>,
}

/// Serialization settings.
#[derive(Debug, Default, Deserialize)]
pub struct OutputSection {
    /// Pretty-print width; 0 writes everything on one line.
    pub indent: Option<usize>,

    /// Capacity of the background writer queue; unset writes inline.
    pub pipeline: Option<usize>,

    /// Read buffer size in bytes.
    pub input_buffer_size: Option<usize>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}
