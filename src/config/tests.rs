use super::load::{default_config_path, default_data_dir, resolve_config_path, write_default_if_missing};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_groove_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("GROOVE_CONFIG_PATH", "/tmp/groove-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/groove-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("groove")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("groove")
            .join("config.toml")
    );
}

#[test]
fn data_dir_prefers_configured_then_xdg_data_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_DATA_HOME", "/tmp/xdg-data");

    assert_eq!(
        default_data_dir().unwrap(),
        std::path::PathBuf::from("/tmp/xdg-data").join("groove")
    );

    let mut cfg = Config::default();
    assert_eq!(cfg.data_dir(), std::path::PathBuf::from("/tmp/xdg-data/groove"));

    cfg.storage.data_dir = Some("/srv/music-data".into());
    assert_eq!(cfg.data_dir(), std::path::PathBuf::from("/srv/music-data"));
}

#[test]
fn config_load_from_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
crossfade_steps = 3
quit_fade_out_ms = 123

[controls]
seek_seconds = 9
volume_step = 10
restart_threshold_seconds = 2

[ui]
header_text = "hello"
list_fields = ["title", "album"]
list_separator = " | "
now_playing_time_fields = ["elapsed", "remaining"]
now_playing_time_separator = " ~ "

[library]
extensions = ["mp3"]
recursive = false
include_hidden = true
follow_links = false

[storage]
data_dir = "/tmp/groove-data"

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("GROOVE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("GROOVE__CONTROLS__SEEK_SECONDS");

    let c = Config::load().unwrap();
    assert_eq!(c.audio.crossfade_steps, 3);
    assert_eq!(c.audio.quit_fade_out_ms, 123);
    assert_eq!(c.controls.seek_seconds, 9);
    assert_eq!(c.controls.volume_step, 10);
    assert_eq!(c.controls.restart_threshold_seconds, 2);
    assert_eq!(c.ui.header_text, "hello");
    assert_eq!(
        c.ui.list_fields,
        vec![TrackDisplayField::Title, TrackDisplayField::Album]
    );
    assert_eq!(c.ui.list_separator, " | ");
    assert_eq!(
        c.ui.now_playing_time_fields,
        vec![TimeField::Elapsed, TimeField::Remaining]
    );
    assert_eq!(c.library.extensions, vec!["mp3".to_string()]);
    assert!(!c.library.recursive);
    assert!(c.library.include_hidden);
    assert!(!c.library.follow_links);
    assert_eq!(c.data_dir(), std::path::PathBuf::from("/tmp/groove-data"));
    assert_eq!(c.logging.level, "debug");
    assert!(c.validate().is_ok());
}

#[test]
fn config_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[controls]
seek_seconds = 5
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("GROOVE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("GROOVE__CONTROLS__SEEK_SECONDS", "15");

    let c = Config::load().unwrap();
    assert_eq!(c.controls.seek_seconds, 15);
}

#[test]
fn validate_rejects_zero_steps_and_bad_volume_step() {
    let mut c = Config::default();
    c.audio.crossfade_steps = 0;
    assert!(c.validate().is_err());

    let mut c = Config::default();
    c.controls.volume_step = 0;
    assert!(c.validate().is_err());

    let mut c = Config::default();
    c.library.extensions = vec!["  ".into()];
    assert!(c.validate().is_err());
}

#[test]
fn default_file_is_written_once_and_parses_back() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("groove").join("config.toml");

    assert!(write_default_if_missing(&cfg_path).unwrap());
    assert!(!write_default_if_missing(&cfg_path).unwrap());

    let _g1 = EnvGuard::set("GROOVE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let c = Config::load().unwrap();
    assert_eq!(c.controls.seek_seconds, ControlsConfig::default().seek_seconds);
    assert!(c.storage.data_dir.is_none());
}
