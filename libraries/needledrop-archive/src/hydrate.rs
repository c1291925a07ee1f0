//! Turning archive file listings into playable tracks and cover art.
//!
//! Format preference: every MP3 in the item if it has any, otherwise every
//! OGG, otherwise whatever recognised audio is there. Formats are never mixed
//! within the preferred families, so a record does not alternate between
//! encodings of the same take.

use crate::config::ArchiveConfig;
use crate::types::ArchiveFile;
use needledrop_core::Track;

const AUDIO_EXTENSIONS: [&str; 5] = [".mp3", ".ogg", ".flac", ".wav", ".m4a"];
const IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".gif"];
const COVER_PATTERNS: [&str; 5] = ["cover", "front", "folder", "album", "artwork"];

/// Preferred lossy families, tried in order
const PREFERRED_FORMATS: [&str; 2] = [".mp3", ".ogg"];

/// Recognised audio file that the archive did not derive from metadata.
pub fn is_audio_file(file: &ArchiveFile) -> bool {
    let name = file.name.to_lowercase();
    AUDIO_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
        && file.source.as_deref() != Some("metadata")
}

pub fn is_image_file(file: &ArchiveFile) -> bool {
    let name = file.name.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Audio files to build tracks from, in listing order.
pub fn preferred_audio_files(files: &[ArchiveFile]) -> Vec<&ArchiveFile> {
    let audio: Vec<&ArchiveFile> = files.iter().filter(|f| is_audio_file(f)).collect();

    for ext in PREFERRED_FORMATS {
        let family: Vec<&ArchiveFile> = audio
            .iter()
            .copied()
            .filter(|f| f.name.to_lowercase().ends_with(ext))
            .collect();
        if !family.is_empty() {
            return family;
        }
    }

    audio
}

/// Display title: the file's own title, else its name without extension and
/// with `-`/`_` turned into spaces.
pub fn track_title(file: &ArchiveFile) -> String {
    if let Some(title) = &file.title {
        return title.clone();
    }

    let stem = match file.name.rfind('.') {
        Some(dot) if dot + 1 < file.name.len() => &file.name[..dot],
        _ => file.name.as_str(),
    };
    stem.replace(['-', '_'], " ")
}

/// Parse an archive `length` field into seconds.
///
/// Accepts plain seconds (`"234.56"`) and clock forms (`"3:54"`,
/// `"1:02:03"`).
pub fn parse_length(length: &str) -> Option<f64> {
    let length = length.trim();
    let seconds = if length.contains(':') {
        length.split(':').try_fold(0.0_f64, |acc, part| {
            part.trim().parse::<f64>().ok().map(|v| acc * 60.0 + v)
        })?
    } else {
        length.parse::<f64>().ok()?
    };

    (seconds.is_finite() && seconds >= 0.0).then_some(seconds)
}

/// Download URL of a file inside an item
pub fn file_url(config: &ArchiveConfig, identifier: &str, file_name: &str) -> String {
    format!(
        "{}/{}/{}",
        config.download_url(),
        identifier,
        urlencoding::encode(file_name)
    )
}

/// Build the playable track list of an item.
pub fn build_tracks(config: &ArchiveConfig, identifier: &str, files: &[ArchiveFile]) -> Vec<Track> {
    preferred_audio_files(files)
        .into_iter()
        .map(|file| {
            Track::new(
                format!("{}/{}", identifier, file.name),
                track_title(file),
                file.length.as_deref().and_then(parse_length),
                file_url(config, identifier, &file.name),
            )
        })
        .collect()
}

/// Pick cover art for an item.
///
/// An image whose name suggests a front cover wins; otherwise the first
/// image; otherwise the archive's generic per-item thumbnail.
pub fn cover_art_url(config: &ArchiveConfig, identifier: &str, files: &[ArchiveFile]) -> String {
    let images: Vec<&ArchiveFile> = files.iter().filter(|f| is_image_file(f)).collect();

    let cover = images.iter().find(|f| {
        let name = f.name.to_lowercase();
        COVER_PATTERNS.iter().any(|p| name.contains(p))
    });

    match cover.or_else(|| images.first()) {
        Some(file) => file_url(config, identifier, &file.name),
        None => format!("{}/{}", config.image_service_url(), identifier),
    }
}
