use std::{env, fs, path::PathBuf};

use crate::error::{Error, Result};

use super::schema::Config;

/// Configuration loading helpers.
///
/// `Config::load` layers environment variables (prefix `GROOVE__`) over an
/// optional config file and falls back to struct defaults.
impl Config {
    /// Load configuration from environment and optional config file.
    pub fn load() -> std::result::Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("GROOVE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let config: Config = cfg.try_deserialize()?;
        Ok(config)
    }

    /// Perform basic validation checks on loaded configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.audio.crossfade_steps == 0 {
            return Err("audio.crossfade_steps must be >= 1".to_string());
        }
        if self.controls.volume_step == 0 || self.controls.volume_step > 100 {
            return Err("controls.volume_step must be within 1..=100".to_string());
        }
        if self.library.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err("library.extensions must name at least one extension".to_string());
        }
        Ok(())
    }

    /// Directory holding the JSON stores and the log file.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.storage.data_dir {
            return dir.clone();
        }
        default_data_dir().unwrap_or_else(|| PathBuf::from("data"))
    }
}

/// Write a default config file to `path` unless something is already there.
///
/// Returns `true` when a file was created.
pub fn write_default_if_missing(path: &std::path::Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let body = toml::to_string_pretty(&Config::default())
        .map_err(|e| Error::Config(::config::ConfigError::Message(e.to_string())))?;
    fs::write(path, body).map_err(|e| Error::io(path, e))?;
    Ok(true)
}

/// Resolve the config path from `GROOVE_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("GROOVE_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/groove/config.toml`
/// or `~/.config/groove/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("groove").join("config.toml"))
}

/// `$XDG_DATA_HOME/groove` or `~/.local/share/groove`.
pub fn default_data_dir() -> Option<PathBuf> {
    let data_home = if let Some(xdg) = env::var_os("XDG_DATA_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("share"))
    };

    data_home.map(|d| d.join("groove"))
}
