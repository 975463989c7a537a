//! Configuration loader and schema types.
//!
//! This module exposes the static configuration schema and helpers to load
//! it from disk and the environment.

mod load;
mod schema;

pub use load::{default_config_path, default_data_dir, resolve_config_path, write_default_if_missing};
pub use schema::*;

#[cfg(test)]
mod tests;
