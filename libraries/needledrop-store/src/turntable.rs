//! Turntable orchestration
//!
//! Composes the shared state with the transport. Exclusive `&mut self` access
//! means a load-then-play can never race a second toggle.

use crate::config::NeedledropConfig;
use crate::error::Result;
use crate::state::{lock_store, SharedStore};
use needledrop_core::{Album, Rpm};
use needledrop_playback::{PositionProbe, Transport, TransportEvent};
use tracing::{debug, info};

pub struct Turntable {
    store: SharedStore,
    transport: Transport,
    seek_step: f64,
    forty_five_rate: f64,
    /// Stream URL of the buffer the transport holds
    loaded_url: Option<String>,
}

impl Turntable {
    pub fn new(store: SharedStore, transport: Transport, seek_step: f64, forty_five_rate: f64) -> Self {
        Self {
            store,
            transport,
            seek_step,
            forty_five_rate,
            loaded_url: None,
        }
    }

    pub fn from_config(store: SharedStore, transport: Transport, config: &NeedledropConfig) -> Self {
        Self::new(store, transport, config.seek_step_secs, config.rpm45_rate)
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn probe(&self) -> PositionProbe {
        self.transport.probe()
    }

    /// Platter speed for the current play state and RPM
    pub fn rotation_speed(&self) -> f64 {
        lock_store(&self.store).rotation_speed(self.forty_five_rate)
    }

    fn rate_for(&self, rpm: Rpm) -> f64 {
        rpm.rate(self.forty_five_rate)
    }

    /// Pause if playing; otherwise play the current track, loading it first
    /// when the transport holds something else
    pub async fn toggle_play_pause(&mut self) -> Result<()> {
        if self.transport.is_playing() {
            self.transport.pause();
            let mut state = lock_store(&self.store);
            state.set_playing(false);
            state.set_playback_position(self.transport.position());
            return Ok(());
        }

        let url = {
            let state = lock_store(&self.store);
            if state.is_loading_track() {
                return Ok(());
            }
            state.current_track().map(|track| track.stream_url.clone())
        };
        let Some(url) = url else {
            debug!("Nothing on the platter");
            return Ok(());
        };

        if self.loaded_url.as_deref() != Some(url.as_str()) || !self.transport.is_loaded() {
            self.load(&url).await?;
        }
        self.start()
    }

    async fn load(&mut self, url: &str) -> Result<()> {
        lock_store(&self.store).set_loading_track(true);
        let result = self.transport.load(url).await;

        let mut state = lock_store(&self.store);
        state.set_loading_track(false);
        match result {
            Ok(()) => {
                self.loaded_url = Some(url.to_string());
                state.set_load_error(None);
                Ok(())
            }
            Err(e) => {
                self.loaded_url = None;
                state.set_load_error(self.transport.load_error().map(str::to_owned));
                state.set_playing(false);
                Err(e.into())
            }
        }
    }

    fn start(&mut self) -> Result<()> {
        let rate = self.rate_for(lock_store(&self.store).rpm());
        self.transport.set_rate(rate);
        self.transport.play()?;
        lock_store(&self.store).set_playing(self.transport.is_playing());
        Ok(())
    }

    /// Stop playback and return to the start of the track
    pub fn stop(&mut self) {
        self.transport.stop();
        lock_store(&self.store).set_playing(false);
    }

    /// Put another record on the platter
    pub fn place_record(&mut self, album: Album) {
        self.stop();
        lock_store(&self.store).set_active_record(album);
    }

    pub fn flip_side(&mut self) {
        self.stop();
        let mut state = lock_store(&self.store);
        state.flip_side();
        info!(side = %state.current_side(), "Record flipped");
    }

    /// Returns `false` on the last track of the side
    pub fn next_track(&mut self) -> bool {
        if !lock_store(&self.store).has_next_track() {
            return false;
        }
        self.stop();
        lock_store(&self.store).next_track()
    }

    /// Returns `false` on the first track of the side
    pub fn previous_track(&mut self) -> bool {
        if !lock_store(&self.store).has_previous_track() {
            return false;
        }
        self.stop();
        lock_store(&self.store).previous_track()
    }

    pub fn rewind(&mut self) -> Result<()> {
        self.seek_by(-self.seek_step)
    }

    pub fn fast_forward(&mut self) -> Result<()> {
        self.seek_by(self.seek_step)
    }

    /// Scrub to an absolute position
    pub fn seek_to(&mut self, position: f64) -> Result<()> {
        self.transport.seek(position)?;
        self.sync_position();
        Ok(())
    }

    fn seek_by(&mut self, delta: f64) -> Result<()> {
        self.transport.seek_by(delta)?;
        self.sync_position();
        Ok(())
    }

    pub fn toggle_rpm(&mut self) -> Rpm {
        let rpm = lock_store(&self.store).toggle_rpm();
        let rate = self.rate_for(rpm);
        self.transport.set_rate(rate);
        rpm
    }

    /// Copy the transport's position into the state
    pub fn sync_position(&self) {
        let position = self.transport.position();
        lock_store(&self.store).set_playback_position(position);
    }

    /// Handle natural track ends
    ///
    /// Advances to the next track on the side and keeps playing. Returns
    /// whether it advanced; the last track of a side just stops.
    pub async fn tick(&mut self) -> Result<bool> {
        let ended = self
            .transport
            .drain_events()
            .contains(&TransportEvent::TrackEnded);
        if !ended {
            return Ok(false);
        }

        let url = {
            let mut state = lock_store(&self.store);
            state.set_playing(false);
            state.set_playback_position(0.0);
            if !state.next_track() {
                info!(side = %state.current_side(), "End of side");
                return Ok(false);
            }
            state.current_track().map(|track| track.stream_url.clone())
        };
        let Some(url) = url else {
            return Ok(false);
        };

        debug!(url = %url, "Advancing to next track");
        self.load(&url).await?;
        self.start()?;
        Ok(true)
    }
}
