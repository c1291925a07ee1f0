/// Track domain type
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A playable track on a record side
///
/// Immutable once built from archive metadata. The identifier is stable and
/// derived from the archive item plus the file name, so the same file always
/// maps to the same track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Stable identifier (`{item}/{file name}`)
    pub id: String,

    /// Display title
    pub title: String,

    /// Duration in seconds, when the archive reports one
    pub duration: Option<f64>,

    /// Absolute URL the audio bytes are fetched from
    pub stream_url: String,
}

impl Track {
    /// Create a new track
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        duration: Option<f64>,
        stream_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            duration,
            stream_url: stream_url.into(),
        }
    }

    /// Get the track duration as a `Duration`
    pub fn duration(&self) -> Option<Duration> {
        self.duration
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_conversion() {
        let track = Track::new("item/a.mp3", "A", Some(90.5), "https://x/a.mp3");
        assert_eq!(track.duration(), Some(Duration::from_millis(90_500)));
    }

    #[test]
    fn unknown_or_invalid_duration() {
        let unknown = Track::new("item/a.mp3", "A", None, "https://x/a.mp3");
        assert_eq!(unknown.duration(), None);

        let negative = Track::new("item/a.mp3", "A", Some(-1.0), "https://x/a.mp3");
        assert_eq!(negative.duration(), None);

        let nan = Track::new("item/a.mp3", "A", Some(f64::NAN), "https://x/a.mp3");
        assert_eq!(nan.duration(), None);
    }
}
