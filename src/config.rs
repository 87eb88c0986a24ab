//! All tunable constants in one place.
//!
//! Every section has a complete `Default`, so a config file only needs the
//! keys it changes:
//!
//! ```toml
//! [layout]
//! x_spacing = 320.0
//!
//! [viewport]
//! max_zoom = 4.0
//!
//! [style.palette]
//! header_bg = "#336699"
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::layout::LayoutEngine;
use crate::style::RenderStyle;
use crate::viewport::ViewportConfig;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    pub layout: LayoutEngine,
    pub viewport: ViewportConfig,
    pub style: RenderStyle,
}

impl DiagramConfig {
    /// Parse and validate a TOML config.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.viewport.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(DiagramConfig::from_toml("").unwrap(), DiagramConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = DiagramConfig::from_toml(
            r##"
            [layout]
            x_spacing = 320.0
            row_height = 30.0

            [viewport]
            max_zoom = 4.0

            [style.palette]
            header_bg = "#336699"
            "##,
        )
        .unwrap();

        assert_eq!(config.layout.x_spacing, 320.0);
        assert_eq!(config.layout.x_start, 60.0);
        assert_eq!(config.layout.metrics.row_height, 30.0);
        assert_eq!(config.layout.metrics.header_height, 36.0);
        assert_eq!(config.viewport.max_zoom, 4.0);
        assert_eq!(config.viewport.min_zoom, 0.25);
        assert_eq!(config.style.palette.header_bg, Color::rgb(0x33, 0x66, 0x99));
    }

    #[test]
    fn test_degenerate_zoom_bounds_are_rejected() {
        for text in [
            "[viewport]\nmin_zoom = 0.0",
            "[viewport]\nmin_zoom = nan\nmax_zoom = nan",
            "[viewport]\nmin_zoom = 2.0\nmax_zoom = 1.0",
            "[viewport]\nzoom_step = -0.1",
            "[viewport]\npan_damping = inf",
        ] {
            let err = DiagramConfig::from_toml(text).unwrap_err();
            assert!(matches!(err, ConfigError::Viewport(_)), "{text}: {err}");
        }
    }

    #[test]
    fn test_bad_color_is_an_error() {
        let err = DiagramConfig::from_toml("[style.palette]\nheader_bg = \"blue\"").unwrap_err();
        assert!(err.to_string().contains("#RRGGBB"));
    }
}
