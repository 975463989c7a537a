//! JSON file helpers shared by the library, playlist, settings and auth stores.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Read and parse `path`. A missing file is `Ok(None)`.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let raw = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::io(path, e)),
    };
    let value = serde_json::from_str(&raw).map_err(|e| Error::json(path, e))?;
    Ok(Some(value))
}

/// Write `value` as pretty JSON, creating parent directories.
///
/// The file is written next to the target and renamed over it so a crash
/// mid-write never leaves a truncated store behind.
pub fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let body = serde_json::to_string_pretty(value).map_err(|e| Error::json(path, e))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, body).map_err(|e| Error::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| Error::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempdir().unwrap();
        let got: Option<BTreeMap<String, u32>> = load_json(&dir.path().join("nope.json")).unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn save_creates_parent_dirs_and_leaves_no_tmp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");
        let mut m = BTreeMap::new();
        m.insert("a".to_string(), 1u32);

        save_json(&path, &m).unwrap();

        let back: BTreeMap<String, u32> = load_json(&path).unwrap().unwrap();
        assert_eq!(back, m);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_a_json_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_json::<BTreeMap<String, u32>>(&path).unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
    }
}
