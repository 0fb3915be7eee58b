//! Editor configuration, read from `config.toml`.
//!
//! ## Learning: Forgiving Config Files
//!
//! Every section carries `#[serde(default)]`, so a file that sets one key
//! still parses and older files keep working after a field is added.
//! Unknown keys are ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main editor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Editing and writing settings
    pub editor: EditorConfig,

    /// Workspace indexing settings
    pub workspace: WorkspaceConfig,

    /// External checker settings
    pub diagnostics: DiagnosticsConfig,

    /// Completion settings
    pub completion: CompletionConfig,

    /// Keyboard settings
    pub keyboard: KeyboardConfig,
}

impl Config {
    /// Loads config from the default location.
    ///
    /// A missing or unreadable file yields the defaults.
    pub fn load() -> Self {
        match Self::load_from_default_path() {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(error = %err, "falling back to default config");
                Self::default()
            }
        }
    }

    /// Reads and parses `path`. Unlike [`Config::load`], failures are returned.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    fn load_from_default_path() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// `<config dir>/balenciaga/config.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("balenciaga").join("config.toml"))
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::default_path()?)
    }

    /// Saves the config to `path`, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Editing and writing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Quiet period before an edited file is saved (0 disables autosave)
    pub autosave_delay_ms: u64,

    /// Entries kept in the recent files list
    pub recent_files_limit: usize,

    /// Reading speed used for the reading-time estimate
    pub reading_words_per_minute: usize,

    /// Initial writing goal in words
    pub writing_goal_words: usize,
}

impl EditorConfig {
    /// Autosave delay, or `None` when disabled.
    pub fn autosave_delay(&self) -> Option<Duration> {
        (self.autosave_delay_ms > 0).then(|| Duration::from_millis(self.autosave_delay_ms))
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_delay_ms: 1000,
            recent_files_limit: 20,
            reading_words_per_minute: 220,
            writing_goal_words: 1000,
        }
    }
}

/// Workspace indexing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Entry names never indexed
    pub ignored_names: Vec<String>,

    /// Index dot-files
    pub show_hidden: bool,

    /// Results shown by quick open
    pub quick_open_limit: usize,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            ignored_names: [
                ".git",
                "node_modules",
                "DerivedData",
                ".DS_Store",
                ".idea",
                ".vscode",
                ".build",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            show_hidden: false,
            quick_open_limit: 50,
        }
    }
}

/// External checker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Run the language toolchains (swiftc, node, tsc, python3); structural
    /// and JSON checks always run
    pub external_tools: bool,

    /// Seconds before a checker process is killed
    pub tool_timeout_secs: u64,
}

impl DiagnosticsConfig {
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs.max(1))
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            external_tools: true,
            tool_timeout_secs: 30,
        }
    }
}

/// Completion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Suggestions returned at most
    pub max_results: usize,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self { max_results: 25 }
    }
}

/// Keyboard configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardConfig {
    /// Custom key bindings: key chord (e.g. `"cmd+shift+b"`) to command
    /// name (e.g. `"format.bold"`)
    pub bindings: HashMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no platform config directory")]
    NoConfigDir,

    #[error("cannot access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot write config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
