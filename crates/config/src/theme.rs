// Theme configuration
// Supports: the built-in classic palette and custom JSON themes

use gridview_core::Color;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// JSON-serializable theme (hex strings)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
    pub colors: ThemeColorsConfig,
}

/// JSON color definitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeColorsConfig {
    // Data cells
    pub window_background: String,
    pub window_foreground: String,

    // Selection
    pub highlight_background: String,
    pub highlight_foreground: String,

    // Headers, checkbox and selection cells
    #[serde(default = "default_body_background")]
    pub body_background: String,
    #[serde(default = "default_body_foreground")]
    pub body_foreground: String,

    // Borders
    #[serde(default = "default_border")]
    pub border: String,
    #[serde(default = "default_gridline")]
    pub gridline: String,
}

fn default_body_background() -> String { "#c0c0c0".into() }
fn default_body_foreground() -> String { "#000000".into() }
fn default_border() -> String { "#000000".into() }
fn default_gridline() -> String { "#c0c0c0".into() }

/// Runtime palette consulted when a cell computes its display format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridTheme {
    pub window_bg: Color,
    pub window_fg: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
    pub body_bg: Color,
    pub body_fg: Color,
    /// Header borders and the current-cell frame
    pub border: Color,
    /// Data cell borders
    pub gridline: Color,
}

impl Default for GridTheme {
    fn default() -> Self {
        Self::classic()
    }
}

impl GridTheme {
    /// Built-in palette: white cells, navy selection, gray 3D headers
    pub fn classic() -> Self {
        GridTheme {
            window_bg: Color::WHITE,
            window_fg: Color::BLACK,
            highlight_bg: Color(0x000080),
            highlight_fg: Color::WHITE,
            body_bg: Color::LIGHT_GRAY,
            body_fg: Color::BLACK,
            border: Color::BLACK,
            gridline: Color::LIGHT_GRAY,
        }
    }

    pub fn from_config(config: &ThemeColorsConfig) -> Result<Self, String> {
        let parse = |field: &str, value: &str| {
            Color::from_hex(value).ok_or_else(|| format!("invalid color for {}: {}", field, value))
        };
        Ok(GridTheme {
            window_bg: parse("window_background", &config.window_background)?,
            window_fg: parse("window_foreground", &config.window_foreground)?,
            highlight_bg: parse("highlight_background", &config.highlight_background)?,
            highlight_fg: parse("highlight_foreground", &config.highlight_foreground)?,
            body_bg: parse("body_background", &config.body_background)?,
            body_fg: parse("body_foreground", &config.body_foreground)?,
            border: parse("border", &config.border)?,
            gridline: parse("gridline", &config.gridline)?,
        })
    }

    /// Load a custom theme file, falling back to the classic palette
    pub fn load_custom(path: &Path) -> Self {
        match Self::read_custom(path) {
            Ok((theme, name)) => {
                log::debug!("Loaded theme '{}' from {}", name, path.display());
                theme
            }
            Err(e) => {
                log::warn!("Error loading theme {}: {}", path.display(), e);
                Self::classic()
            }
        }
    }

    fn read_custom(path: &Path) -> Result<(Self, String), String> {
        let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
        let config: ThemeConfig = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        let theme = Self::from_config(&config.colors)?;
        Ok((theme, config.name))
    }

    /// Directory for user themes
    pub fn custom_themes_dir() -> Option<PathBuf> {
        let config_dir = dirs::config_dir()?;
        Some(config_dir.join("gridview").join("themes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_theme() {
        let theme = GridTheme::classic();
        assert_eq!(theme.window_bg, Color::WHITE);
        assert_eq!(theme.border, Color::BLACK);
    }

    #[test]
    fn test_from_config_defaults_optional_colors() {
        let json = r##"{
            "name": "Paper",
            "colors": {
                "window_background": "#fafafa",
                "window_foreground": "#111111",
                "highlight_background": "#3b82f6",
                "highlight_foreground": "#ffffff"
            }
        }"##;
        let config: ThemeConfig = serde_json::from_str(json).unwrap();
        let theme = GridTheme::from_config(&config.colors).unwrap();
        assert_eq!(theme.window_bg, Color(0xfafafa));
        assert_eq!(theme.body_bg, Color::LIGHT_GRAY);
    }

    #[test]
    fn test_invalid_color_rejected() {
        let config = ThemeColorsConfig {
            window_background: "white".into(),
            window_foreground: "#000000".into(),
            highlight_background: "#000080".into(),
            highlight_foreground: "#ffffff".into(),
            body_background: default_body_background(),
            body_foreground: default_body_foreground(),
            border: default_border(),
            gridline: default_gridline(),
        };
        let err = GridTheme::from_config(&config).unwrap_err();
        assert!(err.contains("window_background"));
    }

    #[test]
    fn test_load_custom_missing_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let theme = GridTheme::load_custom(&dir.path().join("nope.json"));
        assert_eq!(theme, GridTheme::classic());
    }
}
