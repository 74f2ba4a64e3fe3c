//! Persistence layer for console configuration.
//!
//! Provides RON-based save/load for [`ConsoleConfig`] and command aliases.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConsoleConfig;
use crate::core::DevConsole;

/// Default config file name.
pub const DEFAULT_CONFIG_FILE: &str = "console.ron";

/// Serializable console configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConsoleConfigFile {
    #[serde(default)]
    pub settings: ConsoleConfig,
    /// Command aliases (alias -> command line).
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl ConsoleConfigFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the settings and aliases of a console.
    pub fn from_console(console: &DevConsole) -> Self {
        let aliases = console
            .registry()
            .aliases()
            .map(|alias| (alias.name().to_string(), alias.command_line().to_string()))
            .collect();
        Self {
            settings: console.config().clone(),
            aliases,
        }
    }

    /// Load config from a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e.to_string()))?;

        ron::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.display().to_string(), e.to_string()))
    }

    /// Save config to a RON file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::Io(parent.display().to_string(), e.to_string()))?;
            }
        }

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let contents = ron::ser::to_string_pretty(self, pretty)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        fs::write(path, contents)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e.to_string()))
    }

    /// Load config from file, returning default if it is missing or invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Define every alias on `console`. Returns how many were applied.
    ///
    /// Aliases that clash with a command or fail to parse are skipped with
    /// a warning.
    pub fn apply_aliases(&self, console: &mut DevConsole) -> usize {
        let mut applied = 0;
        for (name, command) in &self.aliases {
            match console.add_alias(name, command) {
                Ok(()) => {
                    debug!("Loaded alias: {} -> {}", name, command);
                    applied += 1;
                }
                Err(e) => warn!("Failed to load alias '{}': {}", name, e),
            }
        }
        applied
    }
}

/// Errors that can occur during config operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// IO error (path, message).
    #[error("IO error for '{0}': {1}")]
    Io(String, String),
    /// Parse error (path, message).
    #[error("Parse error for '{0}': {1}")]
    Parse(String, String),
    #[error("Serialization error: {0}")]
    Serialize(String),
}

/// Resource tracking the config file path.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct ConfigPath(pub String);

impl Default for ConfigPath {
    fn default() -> Self {
        Self(DEFAULT_CONFIG_FILE.to_string())
    }
}

/// Read the config file at `path` for plugin startup.
///
/// A missing file is not an error. An unreadable one is logged and
/// ignored.
pub fn read_startup_config(path: &str) -> Option<ConsoleConfigFile> {
    if !Path::new(path).exists() {
        info!("No config file found at '{}', using defaults", path);
        return None;
    }

    match ConsoleConfigFile::load(path) {
        Ok(config) => {
            info!(
                "Loaded config from '{}' with {} aliases",
                path,
                config.aliases.len()
            );
            Some(config)
        }
        Err(e) => {
            error!("Failed to load config: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_file_roundtrip() {
        let mut config = ConsoleConfigFile::new();
        config.settings.max_script_depth = 3;
        config.settings.greeting = Some("hello".into());
        config.aliases.insert("q".to_string(), "quit".to_string());
        config.aliases.insert("kit".to_string(), "give sword; give shield".to_string());

        let temp = NamedTempFile::new().unwrap();
        config.save(temp.path()).unwrap();

        let loaded = ConsoleConfigFile::load(temp.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_file_load_missing() {
        let result = ConsoleConfigFile::load("nonexistent_file.ron");
        assert!(matches!(result, Err(ConfigError::Io(..))));
        assert!(read_startup_config("nonexistent_file.ron").is_none());
    }

    #[test]
    fn test_config_file_load_or_default() {
        let config = ConsoleConfigFile::load_or_default("nonexistent_file.ron");
        assert_eq!(config.settings, ConsoleConfig::default());
        assert!(config.aliases.is_empty());
    }

    #[test]
    fn test_config_parse_partial_ron() {
        let ron_content = r#"(
    settings: (
        open_on_start: true,
        evaluate_unknown_commands: false,
    ),
    aliases: {
        "q": "quit",
    },
)"#;

        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(ron_content.as_bytes()).unwrap();
        temp.flush().unwrap();

        let config = ConsoleConfigFile::load(temp.path()).unwrap();
        assert!(config.settings.open_on_start);
        assert!(!config.settings.evaluate_unknown_commands);
        assert_eq!(config.settings.max_script_depth, 8);
        assert_eq!(config.aliases.get("q"), Some(&"quit".to_string()));
    }

    #[test]
    fn test_config_parse_error() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"(settings: [").unwrap();
        temp.flush().unwrap();

        assert!(matches!(
            ConsoleConfigFile::load(temp.path()),
            Err(ConfigError::Parse(..))
        ));
    }

    #[test]
    fn test_apply_and_snapshot_aliases() {
        let mut console = DevConsole::default();
        console
            .register_command(crate::core::Command::new("give", |_, _| Ok(())))
            .unwrap();

        let mut config = ConsoleConfigFile::new();
        config.aliases.insert("kit".to_string(), "give sword".to_string());
        config.aliases.insert("give".to_string(), "give shield".to_string());

        assert_eq!(config.apply_aliases(&mut console), 1);
        assert_eq!(console.get_alias_argv("kit").unwrap(), vec!["give", "sword"]);

        let snapshot = ConsoleConfigFile::from_console(&console);
        assert_eq!(snapshot.aliases.len(), 1);
        assert_eq!(snapshot.aliases["kit"], "give sword");
    }
}
