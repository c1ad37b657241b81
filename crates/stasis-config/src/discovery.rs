//! Locating and layering `stasis` configuration files.
//!
//! Layers, lowest precedence first:
//! 1. `$STASIS_CONFIG_DIR/config.toml`, or `<platform config dir>/stasis/config.toml`
//! 2. `stasis.toml` in the project directory (the working directory by default)
//! 3. `STASIS_REDIS_URL`, which replaces the whole `[redis]` section
//!
//! Absent files are skipped. A file that exists but cannot be read or parsed
//! is skipped with a warning so a broken user config never hides the project one.

use std::path::{Path, PathBuf};

use crate::{ConfigError, RedisConfig, Result, StasisConfig};

const PROJECT_CONFIG_FILE: &str = "stasis.toml";
const USER_CONFIG_FILE: &str = "config.toml";
const APP_NAME: &str = "stasis";
const CONFIG_DIR_ENV: &str = "STASIS_CONFIG_DIR";
const REDIS_URL_ENV: &str = "STASIS_REDIS_URL";

/// A config file that discovery looked at.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub path: PathBuf,
    /// False for absent files and for files skipped with a warning.
    pub loaded: bool,
}

/// Merged configuration plus a record of how it was assembled.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: StasisConfig,
    /// Every file checked, user layer first.
    pub sources: Vec<ConfigSource>,
    /// One message per file that existed but was skipped.
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Files that contributed to `config`.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter_map(|s| s.loaded.then_some(s.path.as_path()))
            .collect()
    }
}

/// Discover and merge the user and project layers, then apply the env override.
pub fn load_config(project_dir: Option<&Path>) -> Result<LoadedConfig> {
    load_config_with_options(project_dir, None)
}

/// Like [`load_config`], with the user layer read from `user_dir` instead of
/// `STASIS_CONFIG_DIR` or the platform config dir. Tests use this to stay
/// hermetic.
pub fn load_config_with_options(
    project_dir: Option<&Path>,
    user_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    let mut config = StasisConfig::new();
    let mut sources = Vec::new();
    let mut warnings = Vec::new();

    let user_path = match user_dir {
        Some(dir) => Some(dir.join(USER_CONFIG_FILE)),
        None => user_config_path(),
    };
    if let Some(path) = user_path {
        sources.push(merge_layer(&mut config, path, &mut warnings));
    }

    let project_path = project_dir.map_or_else(
        || PathBuf::from(PROJECT_CONFIG_FILE),
        |d| d.join(PROJECT_CONFIG_FILE),
    );
    sources.push(merge_layer(&mut config, project_path, &mut warnings));

    apply_redis_url_override(&mut config, std::env::var(REDIS_URL_ENV).ok());

    Ok(LoadedConfig {
        config,
        sources,
        warnings,
    })
}

/// Read and validate a single file. Used for `--config`, which bypasses
/// discovery and the env override.
pub fn load_config_file(path: &Path) -> Result<StasisConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    StasisConfig::from_toml(&contents)
}

/// Where the user layer lives on this machine, if anywhere.
pub fn user_config_path() -> Option<PathBuf> {
    let dir = match std::env::var(CONFIG_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::config_dir()?.join(APP_NAME),
    };
    Some(dir.join(USER_CONFIG_FILE))
}

fn merge_layer(config: &mut StasisConfig, path: PathBuf, warnings: &mut Vec<String>) -> ConfigSource {
    let loaded = path.is_file()
        && match load_config_file(&path) {
            Ok(layer) => {
                config.merge(layer);
                true
            }
            Err(e) => {
                warnings.push(format!("Failed to load {}: {}", path.display(), e));
                false
            }
        };
    ConfigSource { path, loaded }
}

fn apply_redis_url_override(config: &mut StasisConfig, url: Option<String>) {
    if let Some(url) = url.filter(|u| !u.is_empty()) {
        config.redis = Some(RedisConfig { url });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_file_not_found() {
        let err = load_config_file(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is not valid toml {{{{").unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_layered_merge() {
        let user_dir = TempDir::new().unwrap();
        let project_dir = TempDir::new().unwrap();

        fs::write(
            user_dir.path().join("config.toml"),
            r#"
[redis]
url = "redis://user-host:6379"

[session]
key_prefix = "user:"
"#,
        )
        .unwrap();
        fs::write(
            project_dir.path().join("stasis.toml"),
            r#"
[session]
key_prefix = "project:"
flush_interval_secs = 30
"#,
        )
        .unwrap();

        let loaded =
            load_config_with_options(Some(project_dir.path()), Some(user_dir.path())).unwrap();

        assert_eq!(loaded.loaded_from().len(), 2);
        assert_eq!(loaded.config.session().key_prefix, "project:");
        assert_eq!(loaded.config.session().flush_interval_secs, 30);
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_broken_layer_becomes_warning() {
        let user_dir = TempDir::new().unwrap();
        let project_dir = TempDir::new().unwrap();
        fs::write(
            project_dir.path().join("stasis.toml"),
            "[session]\nflush_interval_secs = 0\n",
        )
        .unwrap();

        let loaded =
            load_config_with_options(Some(project_dir.path()), Some(user_dir.path())).unwrap();

        assert!(loaded.loaded_from().is_empty());
        assert_eq!(loaded.warnings.len(), 1);
        assert_eq!(loaded.config.session().flush_interval_secs, 10);
    }

    #[test]
    fn test_absent_layers_are_recorded_without_warnings() {
        let user_dir = TempDir::new().unwrap();
        let project_dir = TempDir::new().unwrap();

        let loaded =
            load_config_with_options(Some(project_dir.path()), Some(user_dir.path())).unwrap();

        assert_eq!(loaded.sources.len(), 2);
        assert!(loaded.sources.iter().all(|s| !s.loaded));
        assert_eq!(loaded.sources[1].path, project_dir.path().join("stasis.toml"));
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_redis_url_override() {
        let mut config = StasisConfig::from_toml("[redis]\nurl = \"redis://file\"\n").unwrap();

        apply_redis_url_override(&mut config, Some(String::new()));
        assert_eq!(config.redis().url, "redis://file");

        apply_redis_url_override(&mut config, Some("redis://env:6379".to_string()));
        assert_eq!(config.redis().url, "redis://env:6379");
    }
}
