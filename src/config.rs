//! Data directory resolution and `config.toml` loading.
//!
//! Everything taskboard writes lives in one data directory: the JSON store,
//! the optional config file and the TUI log.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fields::{SortDirection, SortKey, StatusCategory};

pub const DB_FILE: &str = "taskboard.json";
pub const CONFIG_FILE: &str = "config.toml";
pub const LOG_FILE: &str = "taskboard.log";

/// Environment variable overriding the data directory.
pub const DIR_ENV: &str = "TASKBOARD_DIR";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub view: ViewDefaults,
}

/// Initial sort and category of the task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewDefaults {
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default)]
    pub direction: SortDirection,
    #[serde(default)]
    pub category: StatusCategory,
}

/// Where the store, config and logs live.
///
/// Precedence: the parent of an explicit `--db` path, then `$TASKBOARD_DIR`,
/// then `~/.taskboard`.
pub fn data_dir(db_override: Option<&Path>) -> PathBuf {
    resolve_data_dir(db_override, env::var(DIR_ENV).ok(), dirs::home_dir())
}

fn resolve_data_dir(db_override: Option<&Path>, env_dir: Option<String>, home: Option<PathBuf>) -> PathBuf {
    if let Some(db) = db_override {
        return match db.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
    }
    if let Some(dir) = env_dir.filter(|d| !d.trim().is_empty()) {
        return PathBuf::from(dir);
    }
    home.unwrap_or_else(|| PathBuf::from(".")).join(".taskboard")
}

/// The store file: the explicit `--db` path, or `taskboard.json` in the data dir.
pub fn db_path(db_override: Option<&Path>, data_dir: &Path) -> PathBuf {
    db_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| data_dir.join(DB_FILE))
}

/// Load `config.toml` from the data dir. A missing file yields defaults.
pub fn load_config(data_dir: &Path) -> Result<Config> {
    let path = data_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let config = toml::from_str::<Config>(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    debug!(path = %path.display(), ?config, "loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_override_wins() {
        let dir = resolve_data_dir(
            Some(Path::new("/tmp/boards/work.json")),
            Some("/elsewhere".into()),
            Some(PathBuf::from("/home/u")),
        );
        assert_eq!(dir, PathBuf::from("/tmp/boards"));
        assert_eq!(resolve_data_dir(Some(Path::new("local.json")), None, None), PathBuf::from("."));
    }

    #[test]
    fn test_env_then_home() {
        assert_eq!(
            resolve_data_dir(None, Some("/srv/tb".into()), Some(PathBuf::from("/home/u"))),
            PathBuf::from("/srv/tb")
        );
        assert_eq!(
            resolve_data_dir(None, Some("  ".into()), Some(PathBuf::from("/home/u"))),
            PathBuf::from("/home/u/.taskboard")
        );
    }

    #[test]
    fn test_db_path() {
        let data = Path::new("/data");
        assert_eq!(db_path(None, data), PathBuf::from("/data/taskboard.json"));
        assert_eq!(db_path(Some(Path::new("x.json")), data), PathBuf::from("x.json"));
    }

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.view.sort, SortKey::CreatedAt);
        assert_eq!(config.view.direction, SortDirection::Desc);
        assert_eq!(config.view.category, StatusCategory::All);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[view]\nsort = \"due-date\"\ncategory = \"active\"\n").unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.view.sort, SortKey::DueDate);
        assert_eq!(config.view.category, StatusCategory::Active);
        assert_eq!(config.view.direction, SortDirection::Desc);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[view]\nsort = \"sideways\"\n").unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse"));
    }
}
