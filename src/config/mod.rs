pub mod event_handler;
pub mod persistence;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use std::{fs, io};

use crate::exec::BridgeMode;
use crate::exec::{DEFAULT_CHAINED_TIMEOUT, DEFAULT_COMMAND_TIMEOUT};
use crate::ollama::DEFAULT_SERVER_URL;

pub use event_handler::{ConfigEvent, ConfigEventHandler, ConfigEventSender};
pub use persistence::{ConfigError, ConfigPersister, ConfigResult};

const APP_DIR: &str = "ollama-chat";
const ENV_PREFIX: &str = "OLLAMA_CHAT";

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_REFORMAT_DELAY_MS: u64 = 100;

pub fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .map(|h| h.join("Library/Application Support").join(APP_DIR))
    }

    #[cfg(target_os = "linux")]
    {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
            .map(|c| c.join(APP_DIR))
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .map(|a| a.join(APP_DIR))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .map(|h| h.join(".config").join(APP_DIR))
    }
}

/// Where conversations live unless `conversations_path` overrides it.
fn get_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local/share")))
            .map(|d| d.join(APP_DIR))
    }

    #[cfg(not(target_os = "linux"))]
    {
        get_config_dir()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Run shell blocks as soon as they complete. Off unless opted in.
    pub auto_execute: bool,
    pub command_timeout_secs: u64,
    pub chained_timeout_secs: u64,
    pub host_bridge: BridgeMode,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            auto_execute: false,
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT.as_secs(),
            chained_timeout_secs: DEFAULT_CHAINED_TIMEOUT.as_secs(),
            host_bridge: BridgeMode::Auto,
        }
    }
}

impl ExecutionConfig {
    #[must_use]
    pub const fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    #[must_use]
    pub const fn chained_timeout(&self) -> Duration {
        Duration::from_secs(self.chained_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server_url: String,
    pub model: Option<String>,
    pub temperature: f32,
    pub system_prompt: Option<String>,
    pub conversations_path: Option<PathBuf>,
    pub reformat_delay_ms: u64,
    pub execution: ExecutionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            system_prompt: None,
            conversations_path: None,
            reformat_delay_ms: DEFAULT_REFORMAT_DELAY_MS,
            execution: ExecutionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Layers `path` (optional) under `OLLAMA_CHAT_*` environment variables.
    /// Nested keys use a double underscore, e.g.
    /// `OLLAMA_CHAT_EXECUTION__AUTO_EXECUTE=true`.
    #[must_use]
    pub fn load_from(path: Option<PathBuf>) -> Self {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .and_then(Config::try_deserialize)
            .unwrap_or_else(|e| {
                eprintln!("Warning: Failed to load config: {e}");
                Self::default()
            })
    }

    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        get_config_dir().map(|dir| dir.join("config.toml"))
    }

    #[must_use]
    pub fn conversations_path(&self) -> PathBuf {
        self.conversations_path.clone().unwrap_or_else(|| {
            get_data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(crate::store::DEFAULT_FILE_NAME)
        })
    }

    #[must_use]
    pub const fn reformat_delay(&self) -> Duration {
        Duration::from_millis(self.reformat_delay_ms)
    }

    pub fn init_default() -> Result<PathBuf, io::Error> {
        let path = Self::get_config_path().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine config directory",
            )
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Config file already exists at {}", path.display()),
            ));
        }

        fs::write(&path, include_str!("config.template.toml"))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_keep_execution_manual() {
        let config = AppConfig::default();
        assert!(!config.execution.auto_execute);
        assert_eq!(config.execution.command_timeout(), Duration::from_secs(30));
        assert_eq!(config.execution.chained_timeout(), Duration::from_secs(60));
        assert_eq!(config.reformat_delay(), Duration::from_millis(100));
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn load_from_file_fills_missing_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "model = \"llama3\"\n\n[execution]\nhost_bridge = \"never\"\ncommand_timeout_secs = 5\n",
        )
        .unwrap();

        let config = AppConfig::load_from(Some(path));
        assert_eq!(config.model.as_deref(), Some("llama3"));
        assert_eq!(config.execution.host_bridge, BridgeMode::Never);
        assert_eq!(config.execution.command_timeout_secs, 5);
        assert_eq!(config.execution.chained_timeout_secs, 60);
        assert!((config.temperature - DEFAULT_TEMPERATURE).abs() < f32::EPSILON);
    }

    #[test]
    fn template_parses() {
        let config: AppConfig = toml::from_str(include_str!("config.template.toml")).unwrap();
        assert!(!config.execution.auto_execute);
    }

    #[test]
    fn explicit_conversations_path_wins() {
        let config = AppConfig {
            conversations_path: Some(PathBuf::from("/tmp/c.json")),
            ..AppConfig::default()
        };
        assert_eq!(config.conversations_path(), PathBuf::from("/tmp/c.json"));
    }
}
