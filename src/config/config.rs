use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::grid::{GridOptions, SortDirection};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub behavior: BehaviorConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use Unicode glyphs for checkboxes and icons
    pub use_glyphs: bool,

    /// Show row numbers in the table
    pub show_row_numbers: bool,

    /// Alternate row background
    pub striped: bool,

    /// Show the aggregate footer when any column defines one
    pub show_footer: bool,

    pub icons: IconConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    pub sort_asc: String,
    pub sort_desc: String,
    pub filter: String,
    pub warning: String,
    pub error: String,
    pub info: String,
    pub success: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Show selection checkboxes
    pub selectable: bool,

    /// Show the search box
    pub searchable: bool,

    /// Field holding the stable row key
    pub key_field: String,

    /// How long corner status messages stay up
    pub auto_hide_ms: u64,

    /// Maximum rows printed in non-interactive mode
    pub max_display_rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeColor {
    #[default]
    Default,
    Primary,
    Secondary,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Accent color for headers and the focused cell
    pub color: ThemeColor,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_glyphs: true,
            show_row_numbers: false,
            striped: true,
            show_footer: true,
            icons: IconConfig::default(),
        }
    }
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            sort_asc: "↑".to_string(),
            sort_desc: "↓".to_string(),
            filter: "⏷".to_string(),
            warning: "⚠️".to_string(),
            error: "❌".to_string(),
            info: "ℹ️".to_string(),
            success: "✅".to_string(),
        }
    }
}

impl IconConfig {
    /// Glyph icons, or their ASCII alternatives
    pub fn for_glyphs(use_glyphs: bool) -> Self {
        if use_glyphs {
            Self::default()
        } else {
            Self::simple()
        }
    }

    /// Header marker for an active sort
    pub fn sort_icon(&self, direction: SortDirection) -> &str {
        match direction {
            SortDirection::Ascending => &self.sort_asc,
            SortDirection::Descending => &self.sort_desc,
        }
    }

    /// ASCII alternatives for terminals without glyph support
    pub fn simple() -> Self {
        Self {
            sort_asc: "^".to_string(),
            sort_desc: "v".to_string(),
            filter: "[f]".to_string(),
            warning: "[!]".to_string(),
            error: "[X]".to_string(),
            info: "[i]".to_string(),
            success: "[OK]".to_string(),
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            selectable: true,
            searchable: true,
            key_field: "id".to_string(),
            auto_hide_ms: 5000,
            max_display_rows: 10000,
        }
    }
}

impl Config {
    /// Load config from the default location, writing defaults if missing
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save()?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("Invalid config {}", path.display()))?;

        if !config.display.use_glyphs {
            config.display.icons = IconConfig::simple();
        }

        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("s42-grid").join("config.toml"))
    }

    /// Grid behaviour flags derived from these settings
    pub fn grid_options(&self) -> GridOptions {
        GridOptions {
            selectable: self.behavior.selectable,
            searchable: self.behavior.searchable,
            use_glyphs: self.display.use_glyphs,
            default_sort: None,
        }
    }

    /// A default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# S42 Grid Configuration File
# Location: ~/.config/s42-grid/config.toml (Linux/macOS)
#           %APPDATA%\s42-grid\config.toml (Windows)

[display]
# Use Unicode glyphs for checkboxes and icons
# Set to false for ASCII-only mode
use_glyphs = true

# Show row numbers in the table
show_row_numbers = false

# Alternate row background
striped = true

# Show the aggregate footer when any column defines one
show_footer = true

# These are automatically set to ASCII when use_glyphs = false
[display.icons]
sort_asc = "↑"
sort_desc = "↓"
filter = "⏷"
warning = "⚠️"
error = "❌"
info = "ℹ️"
success = "✅"

[behavior]
# Show row selection checkboxes
selectable = true

# Enable the search box ('/')
searchable = true

# Field used as the stable row key (rows without it are keyed by position)
key_field = "id"

# Milliseconds before corner status messages disappear
auto_hide_ms = 5000

# Maximum rows printed by --print
max_display_rows = 10000

[theme]
# Accent color: "default", "primary", "secondary", "success", "warning", "danger"
color = "default"
"#
        .to_string()
    }

    /// Interactive first-run setup
    pub fn init_wizard() -> Result<Self> {
        println!("S42 Grid Configuration Setup");
        println!("============================");

        print!("Does your terminal support Unicode glyphs? (y/n) [y]: ");
        std::io::Write::flush(&mut std::io::stdout())?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        let use_glyphs = !input.trim().eq_ignore_ascii_case("n");

        let mut config = Config::default();
        config.display.use_glyphs = use_glyphs;
        if !use_glyphs {
            config.display.icons = IconConfig::simple();
        }

        print!("Show row selection checkboxes? (y/n) [y]: ");
        std::io::Write::flush(&mut std::io::stdout())?;
        input.clear();
        std::io::stdin().read_line(&mut input)?;
        config.behavior.selectable = !input.trim().eq_ignore_ascii_case("n");

        config.save()?;

        println!("\nConfiguration saved to: {:?}", Config::get_config_path()?);
        println!("You can edit this file directly to customize further.");

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.display.use_glyphs);
        assert_eq!(config.behavior.key_field, "id");
        assert_eq!(config.theme.color, ThemeColor::Default);
    }

    #[test]
    fn test_sort_icons_follow_glyph_setting() {
        let ascii = IconConfig::for_glyphs(false);
        assert_eq!(ascii.sort_icon(SortDirection::Ascending), "^");
        assert_eq!(IconConfig::for_glyphs(true).sort_icon(SortDirection::Descending), "↓");
    }

    #[test]
    fn test_commented_default_parses() {
        let config: Config = toml::from_str(&Config::create_default_with_comments()).unwrap();
        assert_eq!(config.behavior.auto_hide_ms, 5000);
        assert!(config.display.striped);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[display]\nuse_glyphs = false\n[theme]\ncolor = \"danger\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.display.icons.error, "[X]");
        assert!(config.behavior.searchable);
        assert_eq!(config.theme.color, ThemeColor::Danger);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.behavior.key_field = "uuid".to_string();
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().behavior.key_field, "uuid");
    }
}
