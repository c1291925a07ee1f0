//! Album types

use super::{Side, Track};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// One side of a record: an ordered run of tracks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlbumSide {
    pub tracks: Vec<Track>,
}

impl AlbumSide {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }
}

/// Both sides of a record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sides {
    pub a: AlbumSide,
    pub b: AlbumSide,
}

impl Sides {
    /// Partition tracks across the two sides.
    ///
    /// Side A receives `ceil(n / 2)` tracks and side B the rest, so a single
    /// track lands on side A with side B left empty.
    pub fn split(mut tracks: Vec<Track>) -> Self {
        let mid = tracks.len().div_ceil(2);
        let b = tracks.split_off(mid);
        Self {
            a: AlbumSide::new(tracks),
            b: AlbumSide::new(b),
        }
    }

    pub fn side(&self, side: Side) -> &AlbumSide {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    /// Total track count across both sides
    pub fn track_count(&self) -> usize {
        self.a.len() + self.b.len()
    }
}

/// An album offered in a crate
///
/// Equality and hashing use the identifier only: two hydrations of the same
/// archive item are the same record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub year: Option<String>,
    pub genre: String,
    pub cover_art_url: Option<String>,
    pub sides: Sides,
    pub source_url: String,
    pub provider: String,
}

impl Album {
    pub fn side(&self, side: Side) -> &AlbumSide {
        self.sides.side(side)
    }

    pub fn track_count(&self) -> usize {
        self.sides.track_count()
    }

    pub fn has_side_b(&self) -> bool {
        !self.sides.b.is_empty()
    }
}

impl PartialEq for Album {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Album {}

impl Hash for Album {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// An album plus its long-form description, fetched on demand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumDetails {
    #[serde(flatten)]
    pub album: Album,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tracks(n: usize) -> Vec<Track> {
        (0..n)
            .map(|i| Track::new(format!("item/{i}"), format!("T{i}"), None, format!("u/{i}")))
            .collect()
    }

    fn album(id: &str, title: &str) -> Album {
        Album {
            id: id.to_string(),
            title: title.to_string(),
            artist: "Artist".to_string(),
            year: None,
            genre: "jazz".to_string(),
            cover_art_url: None,
            sides: Sides::split(tracks(3)),
            source_url: format!("https://archive.org/details/{id}"),
            provider: "Internet Archive".to_string(),
        }
    }

    #[test]
    fn split_sizes() {
        for (n, a, b) in [(0, 0, 0), (1, 1, 0), (2, 1, 1), (5, 3, 2), (8, 4, 4)] {
            let sides = Sides::split(tracks(n));
            assert_eq!((sides.a.len(), sides.b.len()), (a, b), "n = {n}");
        }
    }

    #[test]
    fn split_preserves_order() {
        let sides = Sides::split(tracks(5));
        let ids: Vec<_> = sides
            .a
            .tracks
            .iter()
            .chain(&sides.b.tracks)
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, ["item/0", "item/1", "item/2", "item/3", "item/4"]);
    }

    #[test]
    fn album_equality_is_by_id() {
        assert_eq!(album("x", "First"), album("x", "Second"));
        assert_ne!(album("x", "First"), album("y", "First"));
    }

    #[test]
    fn details_flatten_album_fields() {
        let details = AlbumDetails {
            album: album("x", "First"),
            description: Some("Liner notes".to_string()),
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["id"], "x");
        assert_eq!(json["description"], "Liner notes");
    }

    proptest! {
        #[test]
        fn split_halves_round_side_a_up(n in 0usize..64) {
            let sides = Sides::split(tracks(n));
            prop_assert_eq!(sides.a.len(), n.div_ceil(2));
            prop_assert_eq!(sides.b.len(), n / 2);
            prop_assert_eq!(sides.track_count(), n);
        }
    }
}
