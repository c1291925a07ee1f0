//! Crate loading
//!
//! Bridges a [`MusicProvider`] and the shared state: asks for a crate
//! excluding everything already seen this session, and records the outcome.

use crate::error::Result;
use crate::state::{lock_store, SharedStore};
use needledrop_archive::{MusicProvider, ProviderRegistry};
use needledrop_core::AlbumDetails;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shown when a search succeeds but yields nothing
pub const NOTHING_FOUND: &str = "No records found. The clerk shrugs apologetically.";

/// Result of a crate request that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrateOutcome {
    /// The crate was replaced with this many albums
    Loaded(usize),
    /// The search came back empty; the current crate is untouched
    NothingFound,
}

pub struct CrateLoader {
    provider: Arc<dyn MusicProvider>,
    store: SharedStore,
    crate_size: usize,
}

impl CrateLoader {
    pub fn new(provider: Arc<dyn MusicProvider>, store: SharedStore, crate_size: usize) -> Self {
        Self {
            provider,
            store,
            crate_size,
        }
    }

    /// Loader over a registry provider, the first registered when `name` is
    /// `None` or unknown
    pub fn from_registry(
        registry: &ProviderRegistry,
        name: Option<&str>,
        store: SharedStore,
        crate_size: usize,
    ) -> Result<Self> {
        Ok(Self::new(registry.get(name)?, store, crate_size))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Fill the crate for `genre`
    ///
    /// Failures are recorded as the crate error message and returned.
    pub async fn load_crate(&self, genre: &str) -> Result<CrateOutcome> {
        let exclude = {
            let mut state = lock_store(&self.store);
            state.set_loading_crate(true);
            state.set_crate_error(None);
            state.seen_album_ids().clone()
        };

        debug!(genre, excluded = exclude.len(), "Loading crate");
        let result = self.provider.search(genre, self.crate_size, &exclude).await;

        let mut state = lock_store(&self.store);
        state.set_loading_crate(false);

        match result {
            Ok(albums) if albums.is_empty() => {
                info!(genre, "Search returned no records");
                state.set_crate_error(Some(NOTHING_FOUND.to_string()));
                Ok(CrateOutcome::NothingFound)
            }
            Ok(albums) => {
                let count = albums.len();
                info!(genre, albums = count, "Crate loaded");
                state.set_crate(albums);
                Ok(CrateOutcome::Loaded(count))
            }
            Err(e) => {
                warn!(genre, error = %e, "Crate request failed");
                state.set_crate_error(Some(e.to_string()));
                Err(e.into())
            }
        }
    }

    /// Dig through the same genre again
    ///
    /// Returns `Ok(None)` without a selected genre.
    pub async fn ask_the_clerk(&self) -> Result<Option<CrateOutcome>> {
        let genre = lock_store(&self.store).selected_genre().map(str::to_owned);
        match genre {
            Some(genre) => self.load_crate(&genre).await.map(Some),
            None => Ok(None),
        }
    }

    /// Full details for one album, `None` on any failure
    pub async fn album_details(&self, id: &str) -> Option<AlbumDetails> {
        match self.provider.get_album_details(id).await {
            Ok(details) => Some(details),
            Err(e) => {
                debug!(id, error = %e, "Album details unavailable");
                None
            }
        }
    }
}
