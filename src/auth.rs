//! Optional password protection, stored in `auth.json`.

use std::path::PathBuf;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::store::{load_json, save_json};

#[derive(Debug, Default, Serialize, Deserialize)]
struct AuthFile {
    #[serde(default)]
    password_hash: Option<String>,
}

pub struct Auth {
    data_path: PathBuf,
    password_hash: Option<String>,
}

impl Auth {
    pub fn open(data_path: impl Into<PathBuf>) -> Self {
        let data_path = data_path.into();
        let password_hash = match load_json::<AuthFile>(&data_path) {
            Ok(f) => f.unwrap_or_default().password_hash,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load auth data, no password set");
                None
            }
        };
        Self {
            data_path,
            password_hash,
        }
    }

    fn save(&self) -> Result<()> {
        save_json(
            &self.data_path,
            &AuthFile {
                password_hash: self.password_hash.clone(),
            },
        )
    }

    pub fn is_password_set(&self) -> bool {
        self.password_hash.is_some()
    }

    pub fn set_password(&mut self, password: &str) -> Result<()> {
        self.password_hash = Some(hash_password(password)?);
        self.save()?;
        tracing::info!("password set");
        Ok(())
    }

    /// Always true when no password is set. A bare SHA-256 hex digest left by
    /// older versions is accepted once and replaced with an Argon2 hash.
    pub fn verify_password(&mut self, password: &str) -> bool {
        let Some(stored) = self.password_hash.as_deref() else {
            return true;
        };
        if is_legacy_hash(stored) {
            if !legacy_hash(password).eq_ignore_ascii_case(stored) {
                return false;
            }
            match hash_password(password) {
                Ok(upgraded) => {
                    self.password_hash = Some(upgraded);
                    match self.save() {
                        Ok(()) => tracing::info!("legacy password hash upgraded"),
                        Err(e) => tracing::warn!(error = %e, "failed to save upgraded password hash"),
                    }
                }
                Err(e) => tracing::warn!(error = %e, "failed to upgrade legacy password hash"),
            }
            return true;
        }
        match PasswordHash::new(stored) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash is unreadable");
                false
            }
        }
    }

    pub fn remove_password(&mut self) -> Result<()> {
        self.password_hash = None;
        self.save()?;
        tracing::info!("password removed");
        Ok(())
    }

    /// Returns `Ok(false)` without changing anything when `old` is wrong.
    pub fn change_password(&mut self, old: &str, new: &str) -> Result<bool> {
        if !self.verify_password(old) {
            return Ok(false);
        }
        self.set_password(new)?;
        Ok(true)
    }
}

fn is_legacy_hash(stored: &str) -> bool {
    stored.len() == 64 && stored.bytes().all(|b| b.is_ascii_hexdigit())
}

fn legacy_hash(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| Error::PasswordHash(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn no_password_means_everything_verifies() {
        let dir = tempdir().unwrap();
        let mut auth = Auth::open(dir.path().join("auth.json"));
        assert!(!auth.is_password_set());
        assert!(auth.verify_password("anything"));
    }

    #[test]
    fn set_password_persists_a_salted_hash() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auth.json");
        let mut auth = Auth::open(&path);
        auth.set_password("hunter2").unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("$argon2"));
        assert!(!raw.contains("hunter2"));

        let mut reopened = Auth::open(&path);
        assert!(reopened.is_password_set());
        assert!(reopened.verify_password("hunter2"));
        assert!(!reopened.verify_password("hunter3"));
    }

    #[test]
    fn same_password_hashes_differently() {
        assert_ne!(hash_password("pw").unwrap(), hash_password("pw").unwrap());
    }

    #[test]
    fn change_password_requires_old_one() {
        let dir = tempdir().unwrap();
        let mut auth = Auth::open(dir.path().join("auth.json"));
        auth.set_password("old").unwrap();

        assert!(!auth.change_password("wrong", "new").unwrap());
        assert!(auth.verify_password("old"));

        assert!(auth.change_password("old", "new").unwrap());
        assert!(auth.verify_password("new"));
        assert!(!auth.verify_password("old"));
    }

    #[test]
    fn remove_password_disables_protection() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auth.json");
        let mut auth = Auth::open(&path);
        auth.set_password("pw").unwrap();
        auth.remove_password().unwrap();
        assert!(!Auth::open(&path).is_password_set());
    }

    #[test]
    fn legacy_sha256_hash_verifies_and_is_upgraded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auth.json");
        fs::write(
            &path,
            r#"{"password_hash": "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"}"#,
        )
        .unwrap();

        let mut auth = Auth::open(&path);
        assert!(auth.is_password_set());
        assert!(!auth.verify_password("wrong"));
        assert!(fs::read_to_string(&path).unwrap().contains(&legacy_hash("password")));

        assert!(auth.verify_password("password"));
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("$argon2"));

        let mut reopened = Auth::open(&path);
        assert!(reopened.verify_password("password"));
        assert!(!reopened.verify_password("wrong"));
    }

    #[test]
    fn unparseable_stored_hash_never_verifies() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auth.json");
        fs::write(&path, r#"{"password_hash": "not-a-hash"}"#).unwrap();
        let mut auth = Auth::open(&path);
        assert!(auth.is_password_set());
        assert!(!auth.verify_password("password"));
    }
}
