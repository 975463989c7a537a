use crate::config::{self, Config};

/// Load config, writing a default file on first run. Never fails: a bad or
/// unreadable config is reported on stderr and replaced by defaults.
pub fn load_config() -> Config {
    if let Some(path) = config::resolve_config_path() {
        match config::write_default_if_missing(&path) {
            Ok(true) => eprintln!("groove: wrote default config to {}", path.display()),
            Ok(false) => {}
            Err(e) => eprintln!("groove: could not write default config: {e}"),
        }
    }

    match Config::load() {
        Ok(c) => {
            if let Err(msg) = c.validate() {
                eprintln!("groove: invalid config, using defaults: {msg}");
                Config::default()
            } else {
                c
            }
        }
        Err(e) => {
            eprintln!("groove: failed to load config, using defaults: {e}");
            Config::default()
        }
    }
}
