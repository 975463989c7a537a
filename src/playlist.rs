//! Named, ordered track lists, their JSON store and M3U/PLS interchange.

mod format;
mod manager;
mod model;

pub use format::PlaylistFormat;
pub use manager::{BACKUP_FILE_NAME, PlaylistManager};
pub use model::Playlist;

#[cfg(test)]
mod tests;
