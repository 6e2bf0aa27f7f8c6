//! Configuration file handling for pokesprite.
//!
//! Loads configuration from `~/.config/pokesprite/config.toml` or a custom path.

use serde::{Deserialize, Deserializer};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::art::{Color, RenderStyle, DEFAULT_DOTS_RESIZE, DOTS_THRESHOLD};
use crate::sprites::{default_data_dir, ArtOptions, DEFAULT_ARCHIVE_URL};

/// Configuration file structure for pokesprite.
/// Loaded from ~/.config/pokesprite/config.toml (or custom path via --config).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub sprites: SpritesConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RenderConfig {
    #[serde(default, deserialize_with = "parse_optional")]
    pub style: Option<RenderStyle>,
    #[serde(default)]
    pub shiny: bool,
    #[serde(default = "default_dots_threshold")]
    pub dots_threshold: u8,
    /// 0 disables the resize
    #[serde(default = "default_dots_resize")]
    pub dots_resize: u32,
    #[serde(default, deserialize_with = "parse_optional")]
    pub transparency_color: Option<Color>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            style: None,
            shiny: false,
            dots_threshold: default_dots_threshold(),
            dots_resize: default_dots_resize(),
            transparency_color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct SpritesConfig {
    pub data_dir: Option<PathBuf>,
    pub archive_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct DisplayConfig {
    #[serde(default)]
    pub show_name: bool,
}

fn default_dots_threshold() -> u8 {
    DOTS_THRESHOLD
}

fn default_dots_resize() -> u32 {
    DEFAULT_DOTS_RESIZE
}

/// Deserialize an optional string through the target's `FromStr`.
fn parse_optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Option::<String>::deserialize(deserializer)?
        .map(|value| value.parse().map_err(serde::de::Error::custom))
        .transpose()
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one the default path is used,
    /// and a missing default file gives the default config.
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = default_path();
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn style(&self) -> RenderStyle {
        self.render.style.unwrap_or_default()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.sprites.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn archive_url(&self) -> &str {
        self.sprites
            .archive_url
            .as_deref()
            .unwrap_or(DEFAULT_ARCHIVE_URL)
    }

    /// Rendering options from the `[render]` section.
    pub fn art_options(&self) -> ArtOptions {
        ArtOptions {
            dots_threshold: self.render.dots_threshold,
            dots_resize: NonZeroU32::new(self.render.dots_resize),
            transparency_color: self.render.transparency_color,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        })
        .join("pokesprite")
        .join("config.toml")
}

/// Commented config file written by `pokesprite config init`.
pub const DEFAULT_CONFIG: &str = r##"# pokesprite configuration

[render]
# Style: small (half blocks), large (full blocks), dots (braille)
style = "small"
# Use shiny sprites
shiny = false
# Alpha above this value sets a braille dot
dots_threshold = 127
# Upscale factor before dot rendering (0 disables)
dots_resize = 2
# Treat this color as transparent (#rrggbb or r,g,b)
# transparency_color = "#ffffff"

[sprites]
# Where the archive and rendered art are stored
# data_dir = "~/.local/share/pokesprite"
# Archive to download sprites from
# archive_url = "https://github.com/msikma/pokesprite/archive/refs/heads/master.zip"

[display]
# Print the form name above the art
show_name = false
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.style(), RenderStyle::Small);
        assert_eq!(config.render.dots_threshold, 127);
        assert_eq!(config.render.dots_resize, 2);
        assert_eq!(config.archive_url(), DEFAULT_ARCHIVE_URL);
    }

    #[test]
    fn test_default_config_template_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.style(), RenderStyle::Small);
        assert!(!config.render.shiny);
        assert_eq!(config.art_options(), ArtOptions::default());
        assert!(config.sprites.data_dir.is_none());
        assert!(!config.display.show_name);
    }

    #[test]
    fn test_full_config() {
        let config: Config = toml::from_str(
            r##"
            [render]
            style = "dots"
            shiny = true
            dots_threshold = 10
            dots_resize = 0
            transparency_color = "#00ff00"

            [sprites]
            data_dir = "/tmp/sprites"
            archive_url = "http://localhost/sprites.zip"

            [display]
            show_name = true
            "##,
        )
        .unwrap();

        assert_eq!(config.style(), RenderStyle::Dots);
        assert!(config.render.shiny);
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/sprites"));
        assert_eq!(config.archive_url(), "http://localhost/sprites.zip");
        assert!(config.display.show_name);

        let options = config.art_options();
        assert_eq!(options.dots_threshold, 10);
        assert_eq!(options.dots_resize, None);
        assert_eq!(options.transparency_color, Some(Color::new(0, 255, 0)));
    }

    #[test]
    fn test_invalid_style_rejected() {
        let result: Result<Config, _> = toml::from_str("[render]\nstyle = \"huge\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_color_rejected() {
        let result: Result<Config, _> =
            toml::from_str("[render]\ntransparency_color = \"#12\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.toml");
        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::IoError { .. })
        ));
    }

    #[test]
    fn test_load_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[display]\nshow_name = true\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert!(config.display.show_name);
    }

    #[test]
    fn test_load_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[render\nstyle =").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_default_path_ends_with_config_toml() {
        let path = default_path();
        assert!(path.ends_with("pokesprite/config.toml"));
    }
}
