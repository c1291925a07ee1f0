//! Needledrop Core
//!
//! Platform-agnostic domain types and error handling for the Needledrop
//! record store.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Catalogue Types**: `Track`, `AlbumSide`, `Sides`, `Album`, `AlbumDetails`
//! - **Turntable Types**: `Side`, `Rpm`, `Scene`
//! - **Audio Types**: `AudioBuffer`, `AudioFormat`, `SampleRate`
//! - **Error Handling**: `CoreError` and `Result`
//!
//! Albums and tracks are immutable value objects built once from archive
//! metadata; everything else in the workspace passes them around by clone or
//! `Arc`.
//!
//! # Example
//!
//! ```rust
//! use needledrop_core::{Sides, Track};
//!
//! let tracks: Vec<Track> = (1..=3)
//!     .map(|n| Track::new(
//!         format!("item/{n:02}.mp3"),
//!         format!("Song {n}"),
//!         Some(180.0),
//!         format!("https://archive.org/download/item/{n:02}.mp3"),
//!     ))
//!     .collect();
//!
//! let sides = Sides::split(tracks);
//! assert_eq!(sides.a.len(), 2);
//! assert_eq!(sides.b.len(), 1);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod types;

pub use error::{CoreError, Result};
pub use types::{
    // Catalogue
    Album, AlbumDetails, AlbumSide, Genre, Sides, Track, GENRES,
    // Turntable
    Rpm, Scene, Side,
    // Audio
    AudioBuffer, AudioFormat, SampleRate,
};
