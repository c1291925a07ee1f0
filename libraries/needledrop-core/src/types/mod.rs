mod album;
mod audio;
mod genre;
mod track;
mod turntable;

pub use album::{Album, AlbumDetails, AlbumSide, Sides};
pub use audio::{AudioBuffer, AudioFormat, SampleRate};
pub use genre::{Genre, GENRES};
pub use track::Track;
pub use turntable::{Rpm, Scene, Side};
