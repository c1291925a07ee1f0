//! Time-anchored transport
//!
//! Owns exactly one audio engine, at most one live [`PlaybackNode`] and the
//! anchored timing model. Position is always derived from the clock, never
//! accumulated, so it stays continuous across pause, seek and rate changes.
//!
//! Natural completion is reported by the node's callback into a shared queue
//! tagged with the node's generation; [`Transport::drain_events`] turns
//! current-generation entries into [`TransportEvent::TrackEnded`]. Every
//! intentional stop detaches the callback first, and stale generations are
//! dropped, so a stop can never masquerade as a natural end.

use crate::cache::BufferCache;
use crate::clock::Clock;
use crate::decoder::SymphoniaDecoder;
use crate::engine::{AudioEngine, PlaybackNode};
use crate::error::Result;
use crate::fetch::HttpFetcher;
use crate::timing::TransportTiming;
use needledrop_core::AudioBuffer;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Events surfaced by [`Transport::drain_events`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportEvent {
    /// The loaded buffer played through to its end
    TrackEnded,
}

type EndedQueue = Arc<Mutex<Vec<u64>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Read-only view of the transport's position
///
/// Cheap to clone and `Send`, so a ticker task can sample position without
/// holding the transport.
#[derive(Clone)]
pub struct PositionProbe {
    timing: Arc<Mutex<TransportTiming>>,
    clock: Arc<dyn Clock>,
}

impl PositionProbe {
    pub fn position(&self) -> f64 {
        lock(&self.timing).position(self.clock.now())
    }

    pub fn duration(&self) -> f64 {
        lock(&self.timing).duration()
    }

    pub fn is_playing(&self) -> bool {
        lock(&self.timing).is_playing()
    }
}

/// Single-node playback transport
pub struct Transport {
    engine: Box<dyn AudioEngine>,
    clock: Arc<dyn Clock>,
    cache: BufferCache,
    timing: Arc<Mutex<TransportTiming>>,
    node: Option<Box<dyn PlaybackNode>>,
    buffer: Option<Arc<AudioBuffer>>,
    generation: u64,
    ended: EndedQueue,
    loading: bool,
    load_error: Option<String>,
}

impl Transport {
    pub fn new(engine: Box<dyn AudioEngine>, clock: Arc<dyn Clock>, cache: BufferCache) -> Self {
        Self {
            engine,
            clock,
            cache,
            timing: Arc::new(Mutex::new(TransportTiming::new())),
            node: None,
            buffer: None,
            generation: 0,
            ended: Arc::new(Mutex::new(Vec::new())),
            loading: false,
            load_error: None,
        }
    }

    /// Transport fetching over HTTP and decoding with Symphonia
    pub fn with_http(
        engine: Box<dyn AudioEngine>,
        clock: Arc<dyn Clock>,
        timeout: Duration,
    ) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(timeout)?);
        let cache = BufferCache::new(fetcher, Arc::new(SymphoniaDecoder::new()));
        Ok(Self::new(engine, clock, cache))
    }

    fn timing(&self) -> MutexGuard<'_, TransportTiming> {
        lock(&self.timing)
    }

    /// Prepare `url` for playback
    ///
    /// Stops any current playback first. On failure the transport is left
    /// with nothing loaded, zero duration and [`Self::load_error`] set.
    pub async fn load(&mut self, url: &str) -> Result<()> {
        self.stop();
        self.loading = true;
        self.load_error = None;

        let result = self.cache.get(url).await;
        self.loading = false;

        match result {
            Ok(buffer) => {
                let duration = buffer.duration_secs();
                debug!(url, duration, "Loaded track");
                self.timing().set_duration(duration);
                self.buffer = Some(buffer);
                Ok(())
            }
            Err(e) => {
                warn!(url, error = %e, "Failed to load track");
                self.timing().set_duration(0.0);
                self.buffer = None;
                self.load_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Start or resume from the current position
    ///
    /// Does nothing when no buffer is loaded. If the engine refuses to
    /// start, the transport is left paused.
    pub fn play(&mut self) -> Result<()> {
        let Some(buffer) = self.buffer.clone() else {
            debug!("Play requested with nothing loaded");
            return Ok(());
        };

        self.engine.resume()?;
        if self.is_playing() {
            let now = self.clock.now();
            self.timing().freeze(now);
        }
        self.teardown_node();

        let (offset, rate) = {
            let timing = self.timing();
            (timing.paused_offset(), timing.rate())
        };

        let mut node = self.engine.start(buffer, offset, rate)?;
        self.generation += 1;
        let generation = self.generation;
        let ended = Arc::clone(&self.ended);
        node.set_on_ended(Some(Box::new(move || {
            lock(&ended).push(generation);
        })));
        self.node = Some(node);

        let now = self.clock.now();
        self.timing().start(now);
        debug!(offset, rate, "Playback started");
        Ok(())
    }

    /// Freeze position and release the node
    pub fn pause(&mut self) {
        if !self.is_playing() {
            return;
        }
        let now = self.clock.now();
        let offset = self.timing().freeze(now);
        self.teardown_node();
        debug!(offset, "Playback paused");
    }

    /// Release the node and return to the start
    pub fn stop(&mut self) {
        self.teardown_node();
        self.timing().reset();
        trace!("Playback stopped");
    }

    /// Jump to `position`, clamped to the loaded buffer
    ///
    /// A playing transport restarts at the new offset.
    pub fn seek(&mut self, position: f64) -> Result<()> {
        let was_playing = self.is_playing();
        if was_playing {
            self.pause();
        }
        let clamped = self.timing().seek(position);
        debug!(position = clamped, "Seek");
        if was_playing {
            self.play()?;
        }
        Ok(())
    }

    /// Seek relative to the current position
    pub fn seek_by(&mut self, delta: f64) -> Result<()> {
        self.seek(self.position() + delta)
    }

    /// Change playback rate without moving the position
    pub fn set_rate(&mut self, rate: f64) {
        let now = self.clock.now();
        if !self.timing().set_rate(now, rate) {
            warn!(rate, "Ignoring invalid playback rate");
            return;
        }
        if let Some(node) = self.node.as_mut() {
            node.set_rate(rate);
        }
        debug!(rate, "Playback rate changed");
    }

    /// Take natural-completion events since the last drain
    ///
    /// A completion from the live node marks the transport stopped at
    /// offset zero before it is reported.
    pub fn drain_events(&mut self) -> Vec<TransportEvent> {
        let generations = std::mem::take(&mut *lock(&self.ended));
        let mut events = Vec::new();

        for generation in generations {
            if generation != self.generation || self.node.is_none() {
                trace!(generation, "Dropping stale completion");
                continue;
            }
            self.stop();
            debug!("Track ended");
            events.push(TransportEvent::TrackEnded);
        }
        events
    }

    pub fn position(&self) -> f64 {
        self.timing().position(self.clock.now())
    }

    pub fn duration(&self) -> f64 {
        self.timing().duration()
    }

    pub fn rate(&self) -> f64 {
        self.timing().rate()
    }

    pub fn is_playing(&self) -> bool {
        self.timing().is_playing()
    }

    pub fn is_loaded(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message from the most recent failed load
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn probe(&self) -> PositionProbe {
        PositionProbe {
            timing: Arc::clone(&self.timing),
            clock: Arc::clone(&self.clock),
        }
    }

    /// Detach, stop and disconnect the live node, if any
    fn teardown_node(&mut self) {
        if let Some(mut node) = self.node.take() {
            node.set_on_ended(None);
            if let Err(e) = node.stop() {
                trace!(error = %e, "Node already stopped");
            }
            node.disconnect();
        }
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.teardown_node();
    }
}
