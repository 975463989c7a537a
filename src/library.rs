//! Music library: track records, directory scanning and the persisted
//! collection built from them.

mod display;
mod manager;
mod model;
mod scan;

pub use display::{display_from_fields, format_mmss};
pub use manager::Library;
pub use model::{SortColumn, Track, ViewMode};

#[cfg(test)]
mod tests;
