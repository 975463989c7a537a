//! M3U and PLS text formats.
//!
//! Rendering writes one absolute path per entry. Parsing resolves relative
//! entries against the directory of the playlist file; whether the files
//! exist is left to the caller.

use std::path::{Path, PathBuf};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlaylistFormat {
    M3u,
    Pls,
}

impl PlaylistFormat {
    /// `.pls` files are PLS, everything else is treated as M3U.
    pub fn from_path(path: &Path) -> Self {
        let is_pls = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("pls"))
            .unwrap_or(false);
        if is_pls { Self::Pls } else { Self::M3u }
    }

    pub fn render(self, tracks: &[PathBuf]) -> String {
        let mut out = String::new();
        match self {
            Self::M3u => {
                out.push_str("#EXTM3U\n");
                for p in tracks {
                    out.push_str(&p.to_string_lossy());
                    out.push('\n');
                }
            }
            Self::Pls => {
                out.push_str("[playlist]\n");
                for (i, p) in tracks.iter().enumerate() {
                    out.push_str(&format!("File{}={}\n", i + 1, p.to_string_lossy()));
                }
                out.push_str(&format!("NumberOfEntries={}\n", tracks.len()));
                out.push_str("Version=2\n");
            }
        }
        out
    }

    pub fn parse(self, content: &str, base_dir: &Path) -> Vec<PathBuf> {
        let entries: Vec<&str> = match self {
            Self::M3u => content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .collect(),
            Self::Pls => content
                .lines()
                .map(str::trim)
                .filter_map(|l| {
                    let (key, value) = l.split_once('=')?;
                    let key = key.trim();
                    let is_file_key = key.len() > 4
                        && key.get(..4).is_some_and(|k| k.eq_ignore_ascii_case("file"))
                        && key[4..].chars().all(|c| c.is_ascii_digit());
                    is_file_key.then(|| value.trim())
                })
                .filter(|v| !v.is_empty())
                .collect(),
        };

        entries
            .into_iter()
            .map(|e| {
                let p = PathBuf::from(e);
                if p.is_absolute() { p } else { base_dir.join(p) }
            })
            .collect()
    }
}
