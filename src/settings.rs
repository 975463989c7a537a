mod manager;
mod model;

pub use manager::SettingsManager;
pub use model::{AppSettings, Theme};
