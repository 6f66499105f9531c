use std::path::Path;

use crate::config::TrackDisplayField;

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|s| s.to_str())
}

/// Join the requested `fields` of a track with `sep`.
///
/// Fields that are missing or blank are skipped; when nothing is left the
/// file name is used.
pub fn display_from_fields(
    path: &Path,
    title: &str,
    artist: Option<&str>,
    album: Option<&str>,
    fields: &[TrackDisplayField],
    sep: &str,
) -> String {
    let parts: Vec<String> = fields
        .iter()
        .filter_map(|field| match field {
            TrackDisplayField::FileName => file_name(path).and_then(non_blank),
            TrackDisplayField::Stem => path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(non_blank),
            TrackDisplayField::Title => non_blank(title),
            TrackDisplayField::Artist => artist.and_then(non_blank),
            TrackDisplayField::Album => album.and_then(non_blank),
            TrackDisplayField::Path => Some(path.display().to_string()),
        })
        .collect();

    if parts.is_empty() {
        file_name(path).unwrap_or(title).to_string()
    } else {
        parts.join(sep)
    }
}
