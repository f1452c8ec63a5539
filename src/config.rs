//! Rasterizer configuration
//!
//! Stored as RON (Rusty Object Notation), e.g.
//!
//! ```text
//! (width: 320, height: 240, filter: Bilinear, title: "softraster")
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RasterResult;
use crate::rasterizer::FilterMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Framebuffer width in pixels
    pub width: usize,
    /// Framebuffer height in pixels
    pub height: usize,
    /// Initial texture filter
    pub filter: FilterMode,
    /// Window title used by the demo
    pub title: String,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            width: crate::rasterizer::WIDTH,
            height: crate::rasterizer::HEIGHT,
            filter: FilterMode::Nearest,
            title: "softraster".to_string(),
        }
    }
}

impl RasterConfig {
    /// Load a config from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> RasterResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    /// Parse a config from a RON string. Missing fields take their defaults.
    pub fn from_ron(s: &str) -> RasterResult<Self> {
        let mut config: RasterConfig = ron::from_str(s)?;
        // a zero-sized viewport has no pixels to address
        config.width = config.width.max(1);
        config.height = config.height.max(1);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = RasterConfig::from_ron(
            "(width: 640, height: 480, filter: MipNearest, title: \"demo\")",
        )
        .unwrap();
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 480);
        assert_eq!(config.filter, FilterMode::MipNearest);
        assert_eq!(config.title, "demo");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = RasterConfig::from_ron("(filter: Bilinear)").unwrap();
        assert_eq!(config.width, 320);
        assert_eq!(config.height, 240);
        assert_eq!(config.filter, FilterMode::Bilinear);
    }

    #[test]
    fn test_zero_size_is_bumped() {
        let config = RasterConfig::from_ron("(width: 0, height: 0)").unwrap();
        assert_eq!((config.width, config.height), (1, 1));
    }

    #[test]
    fn test_bad_ron_is_an_error() {
        assert!(RasterConfig::from_ron("(width: \"wide\")").is_err());
    }
}
