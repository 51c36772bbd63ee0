use anyhow::{Context, Result, bail};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const APP_DIR: &str = ".habitual";
const CONFIG_FILE: &str = "config.json";
const DB_FILE: &str = "habits.db";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub db_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_root_dir().join(DB_FILE),
        }
    }
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        Ok(default_root_dir().join(CONFIG_FILE))
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match normalize_config_key(key) {
            "db_path" => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    bail!("db_path requires a file path");
                }
                self.db_path = expand_home(trimmed);
            }
            _ => {
                bail!("Unsupported config key: {key}. Supported keys: db_path|db.path");
            }
        }

        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Option<String> {
        match normalize_config_key(key) {
            "db_path" => Some(self.db_path.display().to_string()),
            _ => None,
        }
    }
}

fn normalize_config_key(key: &str) -> &str {
    match key {
        "db_path" | "db.path" => "db_path",
        _ => key,
    }
}

pub fn expand_home(raw: &str) -> PathBuf {
    raw.strip_prefix("~/")
        .and_then(|stripped| home_dir().map(|home| home.join(stripped)))
        .unwrap_or_else(|| PathBuf::from(raw))
}

fn default_root_dir() -> PathBuf {
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::{Config, expand_home};
    use std::path::PathBuf;

    #[test]
    fn set_value_updates_the_db_path() {
        let mut config = Config::default();
        config
            .set_value("db.path", "/tmp/elsewhere/habits.db")
            .expect("set db_path");

        assert_eq!(config.db_path, PathBuf::from("/tmp/elsewhere/habits.db"));
        assert_eq!(
            config.get_value("db_path"),
            Some("/tmp/elsewhere/habits.db".to_string())
        );
    }

    #[test]
    fn set_value_rejects_unknown_keys_and_empty_paths() {
        let mut config = Config::default();

        let unknown = config.set_value("theme", "dark").expect_err("unknown key");
        assert!(unknown.to_string().contains("Unsupported config key"));

        assert!(config.set_value("db_path", "   ").is_err());
        assert!(config.get_value("theme").is_none());
    }

    #[test]
    fn expand_home_keeps_non_tilde_paths() {
        assert_eq!(expand_home("/var/habits.db"), PathBuf::from("/var/habits.db"));
        assert_eq!(expand_home("relative/habits.db"), PathBuf::from("relative/habits.db"));
    }
}
