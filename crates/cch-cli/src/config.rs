//! Configuration loading and management.

use std::path::{Path, PathBuf};

use cch_export::Format;
use figment::Figment;
use figment::providers::{Env, Format as _, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
///
/// Command-line flags take precedence over every field here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the Claude Code data directory.
    pub source_path: PathBuf,
    /// Default export format.
    pub format: Format,
    pub include_todos: bool,
    pub pretty_json: bool,
    pub show_thinking: bool,
    /// Session cap for exports; 0 is unlimited.
    pub max_sessions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_path: default_source_path().unwrap_or_else(|| PathBuf::from(".claude")),
            format: Format::Markdown,
            include_todos: true,
            pretty_json: true,
            show_thinking: false,
            max_sessions: 0,
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (CC_EXPORT_*)
        figment = figment.merge(Env::prefixed("CC_EXPORT_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for cc-export.
///
/// On Linux: `~/.config/cc-export`
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("cc-export"))
}

/// Returns `~/.claude`.
pub fn default_source_path() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".claude"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_source_is_dot_claude() {
        let path = default_source_path().unwrap();
        assert_eq!(path.file_name().unwrap(), ".claude");
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.format, Format::Markdown);
        assert!(config.include_todos);
        assert!(config.pretty_json);
        assert!(!config.show_thinking);
        assert_eq!(config.max_sessions, 0);
    }

    #[test]
    fn test_dirs_config_path_ends_with_cc_export() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "cc-export");
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"source_path = "/data/claude""#).unwrap();
        writeln!(file, r#"format = "json""#).unwrap();
        writeln!(file, "max_sessions = 25").unwrap();
        writeln!(file, "include_todos = false").unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();

        assert_eq!(config.source_path, PathBuf::from("/data/claude"));
        assert_eq!(config.format, Format::Json);
        assert_eq!(config.max_sessions, 25);
        assert!(!config.include_todos);
        assert!(config.pretty_json);
    }

    #[test]
    fn test_invalid_format_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"format = "pdf""#).unwrap();
        assert!(Config::load_from(Some(file.path())).is_err());
    }
}
