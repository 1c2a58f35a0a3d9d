//! View settings with TOML support.
//!
//! Every field has a default, so a partial file only needs the keys it
//! changes:
//!
//! ```toml
//! width = 400
//! kekulize = true
//! last_selected_color = [0.2, 0.2, 1.0]
//! log_level = "DEBUG"
//! ```

use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::draw::{DrawOptions, Rgb};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid view configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub width: u32,
    pub height: u32,
    /// Depict aromatic rings with alternating single and double bonds.
    pub kekulize: bool,
    pub highlight_color: Rgb,
    /// Colour of the most recently selected atom.
    pub last_selected_color: Rgb,
    pub log_level: LevelFilter,
    /// Remove the `svg:` element prefix from rendered markup.
    pub strip_svg_prefix: bool,
    /// Label stereocentres with their CIP descriptor, e.g. `C:R`.
    pub annotate_chirality: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: 300,
            height: 300,
            kekulize: false,
            highlight_color: Rgb(1.0, 0.5, 0.5),
            last_selected_color: Rgb(1.0, 0.2, 0.2),
            log_level: LevelFilter::Warn,
            strip_svg_prefix: true,
            annotate_chirality: true,
        }
    }
}

impl ViewConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads a TOML file. Missing fields use defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Drawer options derived from this configuration.
    pub fn draw_options(&self) -> DrawOptions {
        DrawOptions {
            highlight_color: self.highlight_color,
            ..DrawOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let config = ViewConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(ViewConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = ViewConfig::from_toml_str(
            r#"
width = 400
kekulize = true
last_selected_color = [0.2, 0.2, 1.0]
log_level = "DEBUG"
"#,
        )
        .unwrap();
        assert_eq!(config.width, 400);
        assert_eq!(config.height, 300);
        assert!(config.kekulize);
        assert_eq!(config.last_selected_color, Rgb(0.2, 0.2, 1.0));
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert!(config.strip_svg_prefix);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            ViewConfig::from_toml_str("width = \"wide\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = ViewConfig::from_file("/nonexistent/molview.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/molview.toml"));
    }
}
