//! Configuration file parsing and discovery

use crate::config::types::Config;
use crate::error::{ConfigError, ConfigResult, SitetaskError};
use directories::ProjectDirs;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file names to search for
const CONFIG_FILE_NAMES: &[&str] = &["sitetask.yml", "sitetask.yaml"];

/// A parsed configuration together with the directory tasks run in
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,

    /// File the configuration came from, if any
    pub path: Option<PathBuf>,

    /// Project root: the config file's directory, or the starting directory
    pub root: PathBuf,
}

/// Find the configuration file by searching a directory and its parents
pub fn find_config_file_from(start_dir: &Path) -> Option<PathBuf> {
    let mut current_dir = Some(start_dir);

    while let Some(dir) = current_dir {
        for file_name in CONFIG_FILE_NAMES {
            let config_path = dir.join(file_name);
            if config_path.is_file() {
                return Some(config_path);
            }
        }
        current_dir = dir.parent();
    }

    None
}

/// Per-user configuration file, e.g. `~/.config/sitetask/sitetask.yml`
pub fn user_config_file() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "sitetask")?;
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dirs.config_dir().join(name))
        .find(|path| path.is_file())
}

/// Parse a configuration file from a path
pub fn parse_config_file(path: &Path) -> Result<Config, SitetaskError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    parse_config(&contents)
}

/// Parse configuration from a string. An empty document yields the defaults.
pub fn parse_config(yaml: &str) -> Result<Config, SitetaskError> {
    if yaml.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}

/// Load the configuration.
///
/// An explicit path must exist. Otherwise `start_dir` and its parents are
/// searched, then the user config directory; with nothing found the built-in
/// defaults are used and `start_dir` becomes the project root.
pub fn load_config(explicit: Option<&Path>, start_dir: &Path) -> Result<LoadedConfig, SitetaskError> {
    let path = match explicit {
        Some(path) => Some(start_dir.join(path)),
        None => find_config_file_from(start_dir),
    };

    if let Some(path) = path {
        let config = parse_config_file(&path)?;
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| start_dir.to_path_buf());
        return Ok(LoadedConfig {
            config,
            path: Some(path),
            root,
        });
    }

    // The user-level file supplies settings only; the project is still here.
    let (config, path) = match user_config_file() {
        Some(path) => (parse_config_file(&path)?, Some(path)),
        None => (Config::default(), None),
    };

    Ok(LoadedConfig {
        config,
        path,
        root: start_dir.to_path_buf(),
    })
}

/// Load with discovery starting at the current directory
pub fn load_config_auto(explicit: Option<&Path>) -> Result<LoadedConfig, SitetaskError> {
    let cwd = env::current_dir()?;
    load_config(explicit, &cwd)
}

/// Load the configured dotenv file into the process environment
pub fn load_env_file(config: &Config, root: &Path) -> ConfigResult<Option<PathBuf>> {
    let Some(env_file) = &config.env_file else {
        return Ok(None);
    };

    let path = root.join(env_file);
    dotenvy::from_path(&path).map_err(|e| ConfigError::EnvFile {
        path: path.clone(),
        error: e.to_string(),
    })?;

    Ok(Some(path))
}
