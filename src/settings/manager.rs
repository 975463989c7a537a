use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Error, Result};
use crate::store::{load_json, save_json};

use super::model::AppSettings;

/// Preferences persisted to `settings.json`.
///
/// Reads go through [`SettingsManager::settings`]; writes go through
/// [`SettingsManager::update`] or one of the list helpers, each of which
/// saves immediately.
pub struct SettingsManager {
    data_path: PathBuf,
    settings: AppSettings,
}

impl SettingsManager {
    pub fn open(data_path: impl Into<PathBuf>) -> Self {
        let data_path = data_path.into();
        let settings = match load_json::<Value>(&data_path) {
            Ok(Some(value)) => merge_known(&AppSettings::default(), value).unwrap_or_else(|e| {
                tracing::warn!(error = %e, path = %data_path.display(), "invalid settings, using defaults");
                AppSettings::default()
            }),
            Ok(None) => AppSettings::default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load settings, using defaults");
                AppSettings::default()
            }
        };

        Self {
            data_path,
            settings,
        }
    }

    pub fn save(&self) -> Result<()> {
        save_json(&self.data_path, &self.settings)
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Mutate the settings and save.
    pub fn update<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut AppSettings),
    {
        f(&mut self.settings);
        self.settings.sanitize();
        self.save()
    }

    /// Move `path` to the front of the recently played list.
    pub fn add_recently_played(&mut self, path: &Path) -> Result<()> {
        self.update(|s| {
            s.recently_played.retain(|p| p != path);
            s.recently_played.insert(0, path.to_path_buf());
            s.recently_played.truncate(s.recently_played_max);
        })
    }

    pub fn recently_played(&self) -> &[PathBuf] {
        &self.settings.recently_played
    }

    pub fn clear_recently_played(&mut self) -> Result<()> {
        self.update(|s| s.recently_played.clear())
    }

    pub fn favorites(&self) -> &[PathBuf] {
        &self.settings.favorites
    }

    pub fn is_favorite(&self, path: &Path) -> bool {
        self.settings.favorites.iter().any(|p| p == path)
    }

    /// Returns `false` if it was already a favorite.
    pub fn add_favorite(&mut self, path: &Path) -> Result<bool> {
        if self.is_favorite(path) {
            return Ok(false);
        }
        self.update(|s| s.favorites.push(path.to_path_buf()))?;
        Ok(true)
    }

    pub fn remove_favorite(&mut self, path: &Path) -> Result<bool> {
        if !self.is_favorite(path) {
            return Ok(false);
        }
        self.update(|s| s.favorites.retain(|p| p != path))?;
        Ok(true)
    }

    /// Flip favorite status and return the new state.
    pub fn toggle_favorite(&mut self, path: &Path) -> Result<bool> {
        if self.is_favorite(path) {
            self.remove_favorite(path)?;
            Ok(false)
        } else {
            self.add_favorite(path)?;
            Ok(true)
        }
    }

    pub fn export(&self, target: &Path) -> Result<()> {
        save_json(target, &self.settings)?;
        tracing::info!(target = %target.display(), "settings exported");
        Ok(())
    }

    /// Take every known key from `source`, keep current values for the rest.
    pub fn import(&mut self, source: &Path) -> Result<()> {
        let value = load_json::<Value>(source)?.ok_or_else(|| {
            Error::io(
                source,
                std::io::Error::new(std::io::ErrorKind::NotFound, "settings file not found"),
            )
        })?;
        let merged = merge_known(&self.settings, value).map_err(|e| Error::json(source, e))?;
        self.settings = merged;
        self.save()?;
        tracing::info!(source = %source.display(), "settings imported");
        Ok(())
    }
}

/// Overlay the keys of `incoming` that `base` knows about. Unknown keys
/// and keys whose value does not fit the field are dropped one by one, so a
/// single bad value keeps its default instead of discarding the whole file.
fn merge_known(base: &AppSettings, incoming: Value) -> serde_json::Result<AppSettings> {
    let mut merged = serde_json::to_value(base)?;
    if let (Value::Object(target), Value::Object(source)) = (&mut merged, incoming) {
        for (key, value) in source {
            let Some(previous) = target.get(&key).cloned() else {
                continue;
            };
            target.insert(key.clone(), value);
            if let Err(e) = serde_json::from_value::<AppSettings>(Value::Object(target.clone())) {
                tracing::warn!(key = %key, error = %e, "ignoring invalid setting");
                target.insert(key, previous);
            }
        }
    }
    let mut settings: AppSettings = serde_json::from_value(merged)?;
    settings.sanitize();
    Ok(settings)
}
