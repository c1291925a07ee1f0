//! Application state
//!
//! [`AppState`] is the single source of truth for the store: scene, genre,
//! crate, seen set, selections and the turntable's deck. Setters are the only
//! mutation path, and each one that changes something notifies subscribed
//! observers with a [`StateChange`].

use crate::error::{Result, StoreError};
use needledrop_core::{Album, Rpm, Scene, Side, Track};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Default selection bound
pub const MAX_RECORDS: usize = 5;

/// State shared between the loader, the turntable and the position ticker
pub type SharedStore = Arc<Mutex<AppState>>;

/// Lock a shared store, recovering from a poisoned lock
pub fn lock_store(store: &SharedStore) -> MutexGuard<'_, AppState> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What changed, delivered to observers after each mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StateChange {
    Scene(Scene),
    Genre(Option<String>),
    Crate { albums: usize, request_count: u32 },
    LoadingCrate(bool),
    CrateError(Option<String>),
    Selection { selected: usize },
    ActiveRecord(Option<String>),
    Deck { side: Side, track_index: usize },
    Playing(bool),
    Rpm(Rpm),
    Position(f64),
    LoadingTrack(bool),
    LoadError(Option<String>),
}

pub type Observer = Box<dyn Fn(&StateChange) + Send>;

/// Handle returned by [`AppState::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct AppState {
    max_records: usize,

    // Flow
    scene: Scene,
    selected_genre: Option<String>,

    // Crate
    current_crate: Vec<Album>,
    seen_album_ids: HashSet<String>,
    selected_records: Vec<Album>,
    is_loading_crate: bool,
    crate_request_count: u32,
    crate_error: Option<String>,

    // Turntable
    active_record: Option<Album>,
    current_side: Side,
    current_track_index: usize,
    is_playing: bool,
    rpm: Rpm,
    playback_position: f64,
    is_loading_track: bool,
    load_error: Option<String>,

    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(MAX_RECORDS)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("scene", &self.scene)
            .field("selected_genre", &self.selected_genre)
            .field("crate", &self.current_crate.len())
            .field("seen", &self.seen_album_ids.len())
            .field("selected", &self.selected_records.len())
            .field("active_record", &self.active_record.as_ref().map(|a| &a.id))
            .field("side", &self.current_side)
            .field("track_index", &self.current_track_index)
            .field("is_playing", &self.is_playing)
            .field("rpm", &self.rpm)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(max_records: usize) -> Self {
        Self {
            max_records,
            scene: Scene::GenreSelect,
            selected_genre: None,
            current_crate: Vec::new(),
            seen_album_ids: HashSet::new(),
            selected_records: Vec::new(),
            is_loading_crate: false,
            crate_request_count: 0,
            crate_error: None,
            active_record: None,
            current_side: Side::A,
            current_track_index: 0,
            is_playing: false,
            rpm: Rpm::ThirtyThree,
            playback_position: 0.0,
            is_loading_track: false,
            load_error: None,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    // ===== Observers =====

    pub fn subscribe(&mut self, observer: Observer) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.observers.push((id, observer));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    fn notify(&self, change: StateChange) {
        for (_, observer) in &self.observers {
            observer(&change);
        }
    }

    // ===== Reads =====

    pub fn scene(&self) -> Scene {
        self.scene
    }

    pub fn selected_genre(&self) -> Option<&str> {
        self.selected_genre.as_deref()
    }

    pub fn current_crate(&self) -> &[Album] {
        &self.current_crate
    }

    pub fn seen_album_ids(&self) -> &HashSet<String> {
        &self.seen_album_ids
    }

    pub fn selected_records(&self) -> &[Album] {
        &self.selected_records
    }

    pub fn is_loading_crate(&self) -> bool {
        self.is_loading_crate
    }

    pub fn crate_request_count(&self) -> u32 {
        self.crate_request_count
    }

    /// Message from the last crate request that produced nothing
    pub fn crate_error(&self) -> Option<&str> {
        self.crate_error.as_deref()
    }

    pub fn active_record(&self) -> Option<&Album> {
        self.active_record.as_ref()
    }

    pub fn current_side(&self) -> Side {
        self.current_side
    }

    pub fn current_track_index(&self) -> usize {
        self.current_track_index
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn rpm(&self) -> Rpm {
        self.rpm
    }

    pub fn playback_position(&self) -> f64 {
        self.playback_position
    }

    pub fn is_loading_track(&self) -> bool {
        self.is_loading_track
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn max_records(&self) -> usize {
        self.max_records
    }

    pub fn remaining_picks(&self) -> usize {
        self.max_records.saturating_sub(self.selected_records.len())
    }

    pub fn can_select_more(&self) -> bool {
        self.selected_records.len() < self.max_records
    }

    pub fn can_leave_store(&self) -> bool {
        !self.selected_records.is_empty()
    }

    pub fn is_record_selected(&self, album_id: &str) -> bool {
        self.selected_records.iter().any(|r| r.id == album_id)
    }

    /// Tracks on the side facing up
    pub fn current_side_tracks(&self) -> &[Track] {
        self.active_record
            .as_ref()
            .map(|album| album.side(self.current_side).tracks.as_slice())
            .unwrap_or_default()
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_side_tracks().get(self.current_track_index)
    }

    pub fn has_next_track(&self) -> bool {
        self.current_track_index + 1 < self.current_side_tracks().len()
    }

    pub fn has_previous_track(&self) -> bool {
        self.current_track_index > 0
    }

    pub fn has_side_b(&self) -> bool {
        self.active_record.as_ref().is_some_and(Album::has_side_b)
    }

    /// Platter speed for the deck animation: 0 when stopped
    pub fn rotation_speed(&self, forty_five_rate: f64) -> f64 {
        if self.is_playing {
            self.rpm.rate(forty_five_rate)
        } else {
            0.0
        }
    }

    // ===== Flow =====

    /// Pick a genre and enter the crate
    ///
    /// Starts a fresh session: seen set, selections and request count clear.
    pub fn select_genre(&mut self, genre: impl Into<String>) -> Result<()> {
        if self.scene != Scene::GenreSelect {
            return Err(StoreError::InvalidTransition {
                from: self.scene,
                action: "select a genre",
            });
        }

        let genre = genre.into();
        info!(genre = %genre, "Genre selected");
        self.selected_genre = Some(genre);
        self.seen_album_ids.clear();
        self.selected_records.clear();
        self.crate_request_count = 0;
        self.crate_error = None;
        self.scene = Scene::CrateBrowse;

        self.notify(StateChange::Genre(self.selected_genre.clone()));
        self.notify(StateChange::Selection { selected: 0 });
        self.notify(StateChange::Scene(self.scene));
        Ok(())
    }

    /// Carry the selection to the turntable, first record on the deck
    pub fn go_to_turntable(&mut self) -> Result<()> {
        if self.scene != Scene::CrateBrowse {
            return Err(StoreError::InvalidTransition {
                from: self.scene,
                action: "go to the turntable",
            });
        }
        let Some(first) = self.selected_records.first().cloned() else {
            return Err(StoreError::NoRecordsSelected);
        };

        self.set_active_record(first);
        self.scene = Scene::Turntable;
        info!(records = self.selected_records.len(), "Leaving the store");
        self.notify(StateChange::Scene(self.scene));
        Ok(())
    }

    /// Back to the genre wall with everything cleared
    pub fn reset_to_genre_select(&mut self) {
        self.scene = Scene::GenreSelect;
        self.selected_genre = None;
        self.current_crate.clear();
        self.seen_album_ids.clear();
        self.selected_records.clear();
        self.crate_error = None;
        self.active_record = None;
        self.current_side = Side::A;
        self.current_track_index = 0;
        self.is_playing = false;
        self.playback_position = 0.0;
        self.load_error = None;
        self.crate_request_count = 0;
        info!("Reset to genre select");

        self.notify(StateChange::Genre(None));
        self.notify(StateChange::Crate {
            albums: 0,
            request_count: 0,
        });
        self.notify(StateChange::Selection { selected: 0 });
        self.notify(StateChange::ActiveRecord(None));
        self.notify(StateChange::Playing(false));
        self.notify(StateChange::Position(0.0));
        self.notify(StateChange::Scene(self.scene));
    }

    // ===== Crate =====

    /// Replace the crate wholesale and remember its albums as seen
    pub fn set_crate(&mut self, albums: Vec<Album>) {
        self.seen_album_ids
            .extend(albums.iter().map(|album| album.id.clone()));
        self.current_crate = albums;
        self.crate_request_count += 1;
        self.crate_error = None;
        debug!(
            albums = self.current_crate.len(),
            seen = self.seen_album_ids.len(),
            request = self.crate_request_count,
            "Crate replaced"
        );
        self.notify(StateChange::Crate {
            albums: self.current_crate.len(),
            request_count: self.crate_request_count,
        });
    }

    pub fn set_loading_crate(&mut self, loading: bool) {
        if self.is_loading_crate != loading {
            self.is_loading_crate = loading;
            self.notify(StateChange::LoadingCrate(loading));
        }
    }

    pub fn set_crate_error(&mut self, message: Option<String>) {
        if self.crate_error != message {
            self.crate_error = message;
            self.notify(StateChange::CrateError(self.crate_error.clone()));
        }
    }

    /// Add a record to the selection
    ///
    /// Returns `false` when the selection is full or already holds it.
    pub fn select_record(&mut self, album: Album) -> bool {
        if !self.can_select_more() || self.is_record_selected(&album.id) {
            return false;
        }
        self.selected_records.push(album);
        self.notify(StateChange::Selection {
            selected: self.selected_records.len(),
        });
        true
    }

    pub fn deselect_record(&mut self, album_id: &str) -> bool {
        let before = self.selected_records.len();
        self.selected_records.retain(|r| r.id != album_id);
        let removed = self.selected_records.len() != before;
        if removed {
            self.notify(StateChange::Selection {
                selected: self.selected_records.len(),
            });
        }
        removed
    }

    // ===== Deck =====

    /// Put a record on the platter: side A, first track, stopped
    pub fn set_active_record(&mut self, album: Album) {
        debug!(album = %album.id, "Record placed");
        let id = album.id.clone();
        self.active_record = Some(album);
        self.current_side = Side::A;
        self.current_track_index = 0;
        self.load_error = None;
        self.notify(StateChange::ActiveRecord(Some(id)));
        self.notify(StateChange::Deck {
            side: Side::A,
            track_index: 0,
        });
        self.set_playing(false);
        self.set_playback_position(0.0);
    }

    pub fn flip_side(&mut self) {
        self.current_side = self.current_side.flipped();
        self.current_track_index = 0;
        self.notify_deck();
        self.set_playback_position(0.0);
    }

    pub fn toggle_rpm(&mut self) -> Rpm {
        self.rpm = self.rpm.toggled();
        self.notify(StateChange::Rpm(self.rpm));
        self.rpm
    }

    /// Step to the next track on this side; never crosses sides
    pub fn next_track(&mut self) -> bool {
        if !self.has_next_track() {
            return false;
        }
        self.current_track_index += 1;
        self.notify_deck();
        self.set_playback_position(0.0);
        true
    }

    pub fn previous_track(&mut self) -> bool {
        if !self.has_previous_track() {
            return false;
        }
        self.current_track_index -= 1;
        self.notify_deck();
        self.set_playback_position(0.0);
        true
    }

    pub fn set_playing(&mut self, playing: bool) {
        if self.is_playing != playing {
            self.is_playing = playing;
            self.notify(StateChange::Playing(playing));
        }
    }

    pub fn set_playback_position(&mut self, position: f64) {
        if self.playback_position != position {
            self.playback_position = position;
            self.notify(StateChange::Position(position));
        }
    }

    pub fn set_loading_track(&mut self, loading: bool) {
        if self.is_loading_track != loading {
            self.is_loading_track = loading;
            self.notify(StateChange::LoadingTrack(loading));
        }
    }

    pub fn set_load_error(&mut self, message: Option<String>) {
        if self.load_error != message {
            self.load_error = message;
            self.notify(StateChange::LoadError(self.load_error.clone()));
        }
    }

    fn notify_deck(&self) {
        self.notify(StateChange::Deck {
            side: self.current_side,
            track_index: self.current_track_index,
        });
    }
}
