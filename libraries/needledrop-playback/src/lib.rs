//! Needledrop Playback
//!
//! The turntable's transport: a time-anchored position model driving one
//! playback node at a time, fed by a fetch-and-decode buffer cache.
//!
//! # Architecture
//!
//! - [`Transport`]: load/play/pause/stop/seek/rate, natural-end events
//! - [`TransportTiming`]: the pure anchored position model
//! - [`Clock`]: [`SystemClock`] for hosts, [`ManualClock`] for tests
//! - [`AudioEngine`] / [`PlaybackNode`]: output seam; [`SimulatedEngine`]
//!   always, `CpalEngine` with the `desktop` feature
//! - [`BufferCache`]: URL-keyed decoded buffers over [`AudioFetcher`] and
//!   [`AudioDecoder`]
//!
//! # Example
//!
//! ```rust
//! use needledrop_playback::TransportTiming;
//!
//! let mut timing = TransportTiming::new();
//! timing.set_duration(180.0);
//! timing.start(0.0);
//! timing.set_rate(10.0, 1.35);
//!
//! // Ten seconds at 33, then two at 45
//! assert!((timing.position(12.0) - 12.7).abs() < 1e-9);
//! ```

#![forbid(unsafe_code)]

pub mod cache;
pub mod clock;
pub mod decoder;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod timing;
pub mod transport;

#[cfg(feature = "desktop")]
pub mod cpal_engine;

pub use cache::BufferCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use decoder::{AudioDecoder, SymphoniaDecoder};
pub use engine::{AudioEngine, EndedCallback, PlaybackNode, SimulatedEngine};
pub use error::{PlaybackError, Result};
pub use fetch::{AudioFetcher, HttpFetcher};
pub use timing::TransportTiming;
pub use transport::{PositionProbe, Transport, TransportEvent};

#[cfg(feature = "desktop")]
pub use cpal_engine::CpalEngine;
