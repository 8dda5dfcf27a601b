use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use serde::{Deserialize, Serialize};

/// Persisted settings, one JSON file under the user config directory.
/// Missing fields fall back to the defaults so old files keep working.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_projects_dir")]
    pub projects_dir: PathBuf,
    #[serde(default)]
    pub recent_dirs: Vec<RecentDirectory>,
    #[serde(default = "default_max_recents")]
    pub max_recents: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentDirectory {
    pub path: PathBuf,
    pub name: String,
    /// epoch milliseconds of the visit
    pub accessed_at: i64,
}

fn default_projects_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("projects")
}

fn default_max_recents() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            projects_dir: default_projects_dir(),
            recent_dirs: Vec::new(),
            max_recents: default_max_recents(),
        }
    }
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("could not determine the user config directory")?;
        Ok(base.join("dirhop").join("config.json"))
    }

    /// load the config file, writing the defaults out on first run
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let parsed = fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|data| serde_json::from_str(&data).map_err(anyhow::Error::from));

        match parsed {
            Ok(config) => Ok(config),
            Err(err) => {
                // keep the broken file around, it is only replaced on the
                // next explicit save
                eprintln!(
                    "{}",
                    format!("failed to load {}: {}, using defaults", path.display(), err)
                        .yellow()
                );
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// move `path` to the front of the recency list, evicting past the cap;
    /// the caller persists with an explicit `save`
    pub fn record_visit(&mut self, path: &Path, name: &str) {
        self.recent_dirs.retain(|recent| recent.path != path);
        self.recent_dirs.insert(
            0,
            RecentDirectory {
                path: path.to_path_buf(),
                name: name.to_string(),
                accessed_at: Utc::now().timestamp_millis(),
            },
        );
        self.recent_dirs.truncate(self.max_recents);
    }

    pub fn lookup(&self, path: &Path) -> Option<&RecentDirectory> {
        self.recent_dirs.iter().find(|recent| recent.path == path)
    }
}
