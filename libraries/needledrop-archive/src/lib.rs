//! Needledrop Archive
//!
//! Crate sourcing for the Needledrop record store: turns a genre into a
//! bounded, deduplicated crate of playable albums pulled from a public audio
//! archive.
//!
//! # Features
//!
//! - **Random paging**: estimates the corpus size, then samples a random page
//!   so repeated searches surface different records
//! - **Deduplication**: albums already seen in the session are never returned
//! - **Hydration**: search hits are enriched into full albums (tracks, sides,
//!   cover art) by a small pull-based worker pool; failed items are dropped
//! - **Provider registry**: providers are looked up by name behind the
//!   `MusicProvider` trait
//!
//! # Example
//!
//! ```ignore
//! use needledrop_archive::{ArchiveConfig, ProviderRegistry};
//! use std::collections::HashSet;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = ProviderRegistry::with_defaults(ArchiveConfig::default())?;
//!     let provider = registry.get(None)?;
//!
//!     let albums = provider.search("jazz", 20, &HashSet::new()).await?;
//!     for album in &albums {
//!         println!("{} - {} ({} tracks)", album.artist, album.title, album.track_count());
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
pub mod hydrate;
mod internet_archive;
pub mod paging;
mod pool;
mod provider;
mod types;

// Re-export main types
pub use client::ArchiveClient;
pub use config::ArchiveConfig;
pub use error::{ArchiveError, Result};
pub use internet_archive::{genre_query, InternetArchiveProvider};
pub use pool::run_concurrent;
pub use provider::{MusicProvider, ProviderRegistry};
pub use types::{ArchiveFile, ItemInfo, ItemMetadata, SearchDoc};
