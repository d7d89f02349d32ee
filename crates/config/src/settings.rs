// Grid settings
// Loaded from ~/.config/gridview/settings.json (or a TOML file)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    // Construction defaults
    #[serde(rename = "grid.defaultRowHeight")]
    pub default_row_height: i32,

    #[serde(rename = "grid.defaultColumnWidth")]
    pub default_column_width: i32,

    /// Used when the table header's stored width is <= 0
    #[serde(rename = "grid.tableHeaderWidth")]
    pub table_header_width: i32,

    /// Used when the table header's stored height is <= 0
    #[serde(rename = "grid.tableHeaderHeight")]
    pub table_header_height: i32,

    /// Default-cell lookup consults the column header before the row header
    #[serde(rename = "grid.columnDefaultsFirst")]
    pub col_first: bool,

    // Pointer
    #[serde(rename = "input.resizeGrip")]
    pub resize_grip: i32,

    // Editors
    #[serde(rename = "editor.insetX")]
    pub editor_inset_x: i32,

    #[serde(rename = "editor.insetY")]
    pub editor_inset_y: i32,

    // Cell content defaults
    #[serde(rename = "cell.checkBoxLabel")]
    pub checkbox_label: String,

    #[serde(rename = "cell.selectionOptions")]
    pub selection_options: String,

    #[serde(rename = "cell.numberFormat")]
    pub number_format: String,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            default_row_height: 24,
            default_column_width: 80,
            table_header_width: 40,
            table_header_height: 20,
            col_first: true,
            resize_grip: 2,
            editor_inset_x: 3,
            editor_inset_y: 2,
            checkbox_label: "Yes/No".to_string(),
            selection_options: "Yes\nNo\n".to_string(),
            number_format: "%f".to_string(),
        }
    }
}

impl GridSettings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gridview");
        config_dir.join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from a specific file. `.toml` files are parsed as TOML,
    /// anything else as JSON with `//` comment lines.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
                return Self::default();
            }
        };

        let parsed = if path.extension().is_some_and(|ext| ext == "toml") {
            Self::from_toml(&contents)
        } else {
            Self::from_json(&contents)
        };

        match parsed {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Error parsing {}: {}; using default settings", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse JSON settings, ignoring lines starting with `//`.
    pub fn from_json(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    /// Parse TOML settings. Dotted keys must be quoted: `"grid.defaultRowHeight" = 30`.
    pub fn from_toml(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Table header width with the fallback applied
    pub fn effective_header_width(&self, stored: i32) -> i32 {
        if stored <= 0 { self.table_header_width } else { stored }
    }

    /// Table header height with the fallback applied
    pub fn effective_header_height(&self, stored: i32) -> i32 {
        if stored <= 0 { self.table_header_height } else { stored }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = GridSettings::default();
        assert_eq!(s.default_row_height, 24);
        assert_eq!(s.table_header_width, 40);
        assert_eq!(s.table_header_height, 20);
        assert_eq!(s.checkbox_label, "Yes/No");
        assert_eq!(s.selection_options, "Yes\nNo\n");
        assert!(s.col_first);
    }

    #[test]
    fn test_json_with_comments_and_partial_keys() {
        let json = r#"{
    // Grid
    "grid.defaultRowHeight": 30,
    "input.resizeGrip": 4
}"#;
        let s = GridSettings::from_json(json).unwrap();
        assert_eq!(s.default_row_height, 30);
        assert_eq!(s.resize_grip, 4);
        // Unspecified keys keep their defaults
        assert_eq!(s.default_column_width, 80);
    }

    #[test]
    fn test_toml() {
        let s = GridSettings::from_toml("\"grid.columnDefaultsFirst\" = false\n\"cell.numberFormat\" = \"%.2f\"\n")
            .unwrap();
        assert!(!s.col_first);
        assert_eq!(s.number_format, "%.2f");
    }

    #[test]
    fn test_effective_header_size() {
        let s = GridSettings::default();
        assert_eq!(s.effective_header_width(0), 40);
        assert_eq!(s.effective_header_width(-5), 40);
        assert_eq!(s.effective_header_width(55), 55);
        assert_eq!(s.effective_header_height(0), 20);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut s = GridSettings::default();
        s.default_column_width = 120;
        s.save_to(&path).unwrap();

        let loaded = GridSettings::load_from(&path);
        assert_eq!(loaded, s);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(GridSettings::load_from(&path), GridSettings::default());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(GridSettings::load_from(&dir.path().join("absent.toml")), GridSettings::default());
    }
}
