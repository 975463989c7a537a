use std::time::Duration;

use crate::config::TrackDisplayField;

use super::model::Track;

/// Format a `Duration` as `M:SS`.
pub fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Build a display string for a track according to the provided `fields` and separator.
///
/// Composes metadata fields in the configured order, skipping blanks and
/// unknown-artist/album placeholders, and falls back to `title` when no
/// parts were produced.
pub fn display_from_fields(track: &Track, fields: &[TrackDisplayField], sep: &str) -> String {
    let mut parts: Vec<String> = Vec::new();

    for f in fields {
        match f {
            TrackDisplayField::Title => {
                if !track.title.trim().is_empty() {
                    parts.push(track.title.trim().to_string());
                }
            }
            TrackDisplayField::Artist => {
                if track.has_known_artist() {
                    parts.push(track.artist.trim().to_string());
                }
            }
            TrackDisplayField::Album => {
                if track.has_known_album() {
                    parts.push(track.album.trim().to_string());
                }
            }
            TrackDisplayField::Duration => {
                if !track.duration.is_zero() {
                    parts.push(format_mmss(track.duration));
                }
            }
            TrackDisplayField::Filename => {
                if let Some(stem) = track.path.file_stem().and_then(|s| s.to_str()) {
                    if !stem.trim().is_empty() {
                        parts.push(stem.to_string());
                    }
                }
            }
            TrackDisplayField::Path => {
                parts.push(track.path.display().to_string());
            }
        }
    }

    if parts.is_empty() {
        track.title.clone()
    } else {
        parts.join(sep)
    }
}
