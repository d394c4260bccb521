use parking_lot::Mutex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use toml::{Table, Value};

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not write config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

const NEW_FILE_HEADER: &str = "# ollama-chat configuration. See `ollama-chat config init` for every option.\n\n";

/// Writes single settings back to `config.toml`.
///
/// Only the touched key changes: the file is edited as a TOML table, so
/// keys the user set by hand survive and defaults are not written out.
pub struct ConfigPersister {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ConfigPersister {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_model(&self, model: &str) -> ConfigResult<()> {
        self.set("model", Value::String(model.to_string()))
    }

    /// Sets a top-level `key`, creating the file when missing.
    pub fn set(&self, key: &str, value: Value) -> ConfigResult<()> {
        let _guard = self.write_lock.lock();

        let (mut table, existed) = match fs::read_to_string(&self.path) {
            Ok(content) => (content.parse::<Table>()?, true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => (Table::new(), false),
            Err(e) => return Err(e.into()),
        };

        if table.get(key) == Some(&value) {
            return Ok(());
        }
        table.insert(key.to_string(), value);

        let body = toml::to_string(&table)?;
        let content = if existed {
            body
        } else {
            format!("{NEW_FILE_HEADER}{body}")
        };
        self.replace_file(&content)
    }

    fn replace_file(&self, content: &str) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let staging = self.path.with_extension("toml.tmp");
        fs::write(&staging, content)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use tempfile::TempDir;

    #[test]
    fn model_change_keeps_other_keys() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "model = \"llama3\"\nsystem_prompt = \"be brief\"\n\n[execution]\nauto_execute = true\n",
        )
        .expect("seed config");

        ConfigPersister::new(path.clone())
            .set_model("qwen2.5:7b")
            .expect("set model");

        let config: AppConfig =
            toml::from_str(&fs::read_to_string(&path).expect("read")).expect("parse");
        assert_eq!(config.model.as_deref(), Some("qwen2.5:7b"));
        assert_eq!(config.system_prompt.as_deref(), Some("be brief"));
        assert!(config.execution.auto_execute);
        assert!(!temp_dir.path().join("config.toml.tmp").exists());
    }

    #[test]
    fn missing_file_is_created_with_only_the_key() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("nested/config.toml");

        ConfigPersister::new(path.clone())
            .set_model("mistral")
            .expect("set model");

        let content = fs::read_to_string(&path).expect("read");
        assert!(content.starts_with("# ollama-chat configuration"));
        assert!(content.contains("model = \"mistral\""));
        assert!(!content.contains("temperature"));
    }

    #[test]
    fn broken_file_is_left_alone() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "model = ").expect("seed config");

        let result = ConfigPersister::new(path.clone()).set_model("llama3");

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        assert_eq!(fs::read_to_string(&path).expect("read"), "model = ");
    }
}
