//! Configuration for command-deck

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Directory holding currentTasks.json and taskHistory.json
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Team roster offered as assignees and listed in the workload view
    #[serde(default = "default_team")]
    pub team: Vec<String>,

    /// Open tasks a member can carry before counting as fully loaded
    #[serde(default = "default_member_capacity")]
    pub member_capacity: usize,

    /// How long a completed card lingers on the board
    #[serde(default = "default_removal_delay_ms")]
    pub removal_delay_ms: u64,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("command-deck")
}

fn default_team() -> Vec<String> {
    crate::DEFAULT_TEAM.iter().map(|s| s.to_string()).collect()
}

fn default_member_capacity() -> usize {
    crate::DEFAULT_MEMBER_CAPACITY
}

fn default_removal_delay_ms() -> u64 {
    crate::DEFAULT_REMOVAL_DELAY_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            team: default_team(),
            member_capacity: default_member_capacity(),
            removal_delay_ms: default_removal_delay_ms(),
            log_level: None,
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            return Self::load_from(config_path);
        }

        for path in Self::default_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        debug!("Config::load: no config file found, using defaults");
        Ok(Config::default())
    }

    fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("command-deck").join("config.yml")),
            Some(PathBuf::from("command-deck.yml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).context(format!("Failed to read config: {}", path.display()))?;
        let config: Config =
            serde_yaml::from_str(&content).context(format!("Failed to parse config: {}", path.display()))?;
        debug!(path = %path.display(), "Config::load: loaded config file");
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn removal_delay(&self) -> Duration {
        Duration::from_millis(self.removal_delay_ms)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.member_capacity, 4);
        assert_eq!(config.removal_delay(), Duration::from_millis(300));
        assert_eq!(config.team.len(), 4);
        assert!(config.data_dir.ends_with("command-deck"));
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        std::fs::write(&path, "member_capacity: 6\nlog_level: debug\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.member_capacity, 6);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.removal_delay_ms, 300);
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        let config = Config {
            data_dir: temp.path().join("data"),
            team: vec!["Ada".to_string()],
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(Config::load(Some(&path)).unwrap(), config);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(Config::load(Some(&temp.path().join("nope.yml"))).is_err());
    }
}
