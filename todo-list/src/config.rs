use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_STORE_PATH: &str = "tasks.json";
const DEFAULT_CONFIG_FILE: &str = "todo";

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Loads configuration from an optional file and `TODO_`-prefixed environment variables.
    ///
    /// Without an explicit `file`, `todo.toml` in the working directory is read when present.
    pub fn load(file: Option<&Path>) -> anyhow::Result<Self> {
        let file_source = match file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        let settings = config::Config::builder()
            .add_source(file_source)
            .add_source(config::Environment::with_prefix("TODO"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn log_level(&self) -> anyhow::Result<tracing::Level> {
        self.log_level
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid log level '{}'", self.log_level))
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    fn from_toml(toml_str: &str) -> Config {
        config::Config::builder()
            .add_source(config::File::from_str(toml_str, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_config_deserialize_from_toml() {
        // Arrange
        let toml_str = r#"
            store_path = "/var/lib/todo/tasks.json"
            log_level = "debug"
        "#;

        // Act
        let config = from_toml(toml_str);

        // Assert
        assert_eq!(config.store_path, PathBuf::from("/var/lib/todo/tasks.json"));
        assert_eq!(config.log_level().unwrap(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_config_defaults_for_missing_fields() {
        let config = from_toml("");

        assert_eq!(config, Config::default());
        assert_eq!(config.store_path, PathBuf::from("tasks.json"));
        assert_eq!(config.log_level().unwrap(), tracing::Level::WARN);
    }

    #[test]
    fn test_config_rejects_unknown_log_level() {
        let config = from_toml(r#"log_level = "chatty""#);

        assert!(config.log_level().is_err());
    }

    #[test]
    fn test_config_loads_explicit_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.child("custom.toml");
        file.write_str(r#"store_path = "elsewhere.json""#).unwrap();

        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.store_path, PathBuf::from("elsewhere.json"));
    }

    #[test]
    fn test_config_missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();

        let result = Config::load(Some(temp.child("absent.toml").path()));

        assert!(result.is_err());
    }
}
