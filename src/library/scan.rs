use std::path::{Path, PathBuf};

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::Accessor;
use log::{debug, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::display::display_from_fields;
use super::model::Track;

/// Whether `path` carries one of the configured audio extensions (case-insensitive).
pub fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn non_blank(v: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Build a `Track` for a single file. Unreadable tags are not an error: the
/// track falls back to its file name.
pub fn track_from_path(path: &Path, settings: &LibrarySettings) -> Track {
    let mut track = Track::bare(path);

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            let d = tagged.properties().duration();
            if !d.is_zero() {
                track.duration = Some(d);
            }
            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(title) = non_blank(tag.title()) {
                    track.title = title;
                }
                track.artist = non_blank(tag.artist());
                track.album = non_blank(tag.album());
            }
        }
        Err(e) => debug!("no metadata for {}: {e}", path.display()),
    }

    track.display = display_from_fields(
        path,
        &track.title,
        track.artist.as_deref(),
        track.album.as_deref(),
        &settings.display_fields,
        &settings.display_separator,
    );
    track
}

/// Collect every audio file below `dir`, sorted by display name.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings)
        {
            tracks.push(track_from_path(path, settings));
        }
    }

    tracks.sort_by(|a, b| a.display.to_lowercase().cmp(&b.display.to_lowercase()));
    tracks
}

/// Turn a list of user-supplied paths into tracks, preserving their order.
/// Directories are scanned; files without an audio extension and missing
/// paths are skipped.
pub fn collect_tracks(paths: &[PathBuf], settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks = Vec::new();
    for p in paths {
        if p.is_dir() {
            tracks.extend(scan(p, settings));
        } else if p.is_file() && is_audio_file(p, settings) {
            tracks.push(track_from_path(p, settings));
        } else {
            warn!("skipping {}: not an audio file", p.display());
        }
    }
    tracks
}
