//! Genre catalogue

use serde::Serialize;

/// A genre a customer can browse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Genre {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

/// Genres offered on the genre-select scene, in display order
pub const GENRES: [Genre; 8] = [
    Genre { id: "jazz", label: "Jazz", icon: "🎺" },
    Genre { id: "classical", label: "Classical", icon: "🎻" },
    Genre { id: "blues", label: "Blues", icon: "🎸" },
    Genre { id: "folk", label: "Folk", icon: "🪕" },
    Genre { id: "world", label: "World Music", icon: "🥁" },
    Genre { id: "gospel", label: "Gospel", icon: "🎹" },
    Genre { id: "spoken", label: "Spoken Word", icon: "🎙" },
    Genre { id: "surprise", label: "Surprise Me", icon: "🎲" },
];

impl Genre {
    /// Catch-all genre used when an id is not in the catalogue
    pub const SURPRISE: &'static str = "surprise";

    /// Look up a genre by id
    pub fn find(id: &str) -> Option<&'static Genre> {
        GENRES.iter().find(|g| g.id == id)
    }
}
