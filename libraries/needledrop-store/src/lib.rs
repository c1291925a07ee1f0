//! Needledrop Store
//!
//! Application state and turntable orchestration for the Needledrop record
//! store. Hosts build a [`RecordStore`] from a [`NeedledropConfig`], drive it
//! through the loader and turntable, and observe the shared [`AppState`].
//!
//! # Flow
//!
//! ```text
//! genre-select --select_genre--> crate-browse --go_to_turntable--> turntable
//!       ^                                                              |
//!       +------------------- reset_to_genre_select --------------------+
//! ```
//!
//! # Example
//!
//! ```ignore
//! use needledrop_playback::{SimulatedEngine, SystemClock};
//! use needledrop_store::{lock_store, NeedledropConfig, RecordStore};
//! use std::sync::Arc;
//!
//! let config = NeedledropConfig::load()?;
//! let mut store = RecordStore::new(
//!     config,
//!     Box::new(SimulatedEngine::new()),
//!     Arc::new(SystemClock::new()),
//! )?;
//!
//! lock_store(store.state()).select_genre("jazz")?;
//! store.loader().load_crate("jazz").await?;
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod state;
pub mod ticker;
pub mod turntable;

pub use config::NeedledropConfig;
pub use error::{Result, StoreError};
pub use loader::{CrateLoader, CrateOutcome, NOTHING_FOUND};
pub use logging::init_logging;
pub use state::{lock_store, AppState, Observer, SharedStore, StateChange, SubscriptionId};
pub use ticker::PositionTicker;
pub use turntable::Turntable;

use needledrop_archive::{MusicProvider, ProviderRegistry};
use needledrop_playback::{AudioEngine, Clock, Transport};
use std::sync::Arc;
use tracing::info;

/// A fully wired store: state, crate loader, turntable and position ticker
///
/// The position ticker only mirrors position into the state. Advancing to
/// the next track after a natural end is driven by the host calling
/// [`RecordStore::tick`] (or [`Turntable::tick`]) from its own loop.
pub struct RecordStore {
    config: NeedledropConfig,
    state: SharedStore,
    loader: CrateLoader,
    turntable: Turntable,
    ticker: Option<PositionTicker>,
}

impl RecordStore {
    /// Store backed by the archive in `config`, playing through `engine`
    pub fn new(
        config: NeedledropConfig,
        engine: Box<dyn AudioEngine>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let registry = ProviderRegistry::with_defaults(config.archive.clone())?;
        let transport = Transport::with_http(engine, clock, config.archive.timeout())?;
        Ok(Self::with_parts(config, registry.get(None)?, transport))
    }

    /// Store over an explicit provider and transport
    pub fn with_parts(
        config: NeedledropConfig,
        provider: Arc<dyn MusicProvider>,
        transport: Transport,
    ) -> Self {
        let state = AppState::new(config.max_records).into_shared();
        let loader = CrateLoader::new(provider, Arc::clone(&state), config.crate_size);
        let turntable = Turntable::from_config(Arc::clone(&state), transport, &config);
        info!(provider = %loader.provider_name(), "Record store open");

        Self {
            config,
            state,
            loader,
            turntable,
            ticker: None,
        }
    }

    pub fn config(&self) -> &NeedledropConfig {
        &self.config
    }

    pub fn state(&self) -> &SharedStore {
        &self.state
    }

    pub fn loader(&self) -> &CrateLoader {
        &self.loader
    }

    pub fn turntable(&mut self) -> &mut Turntable {
        &mut self.turntable
    }

    /// Start mirroring position into the state; must run inside a tokio
    /// runtime. Restarting replaces the previous ticker.
    ///
    /// The ticker never advances tracks; see [`Self::tick`].
    pub fn start_ticker(&mut self) {
        self.ticker = Some(PositionTicker::spawn(
            self.turntable.probe(),
            Arc::clone(&self.state),
            self.config.tick_interval(),
        ));
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(PositionTicker::is_running)
    }

    /// Handle natural track ends, advancing within the side
    ///
    /// Returns whether a new track started.
    pub async fn tick(&mut self) -> Result<bool> {
        self.turntable.tick().await
    }

    /// Stop the ticker and playback
    pub async fn shutdown(mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.shutdown().await;
        }
        self.turntable.stop();
    }
}
