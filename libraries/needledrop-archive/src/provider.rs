//! Provider abstraction and registry.

use crate::config::ArchiveConfig;
use crate::error::{ArchiveError, Result};
use crate::internet_archive::InternetArchiveProvider;
use async_trait::async_trait;
use needledrop_core::{Album, AlbumDetails};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// A source of records.
///
/// Calling code only ever sees this capability set, so providers can be
/// swapped through the [`ProviderRegistry`] without touching it.
#[async_trait]
pub trait MusicProvider: Send + Sync {
    /// Registry key and the provider name stamped on every album
    fn name(&self) -> &str;

    /// Up to `count` playable albums for `genre`, none of them in
    /// `exclude_ids`. Only a failure of the primary page query is an error;
    /// an empty list is a valid "nothing found".
    async fn search(
        &self,
        genre: &str,
        count: usize,
        exclude_ids: &HashSet<String>,
    ) -> Result<Vec<Album>>;

    /// One album with its description
    async fn get_album_details(&self, id: &str) -> Result<AlbumDetails>;

    /// Stream URL for a track id
    async fn get_stream_url(&self, track_id: &str) -> Result<String>;

    /// Cover art URL for an album id
    async fn get_album_art(&self, id: &str) -> Result<Option<String>>;
}

/// Providers keyed by name, in registration order.
///
/// The first registered provider is the default.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn MusicProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the Internet Archive provider
    pub fn with_defaults(config: ArchiveConfig) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(InternetArchiveProvider::new(config)?));
        Ok(registry)
    }

    /// Register a provider, replacing any provider of the same name in place.
    pub fn register(&mut self, provider: Arc<dyn MusicProvider>) {
        debug!(provider = %provider.name(), "Registering provider");
        match self.providers.iter_mut().find(|p| p.name() == provider.name()) {
            Some(slot) => *slot = provider,
            None => self.providers.push(provider),
        }
    }

    /// Look a provider up by name.
    ///
    /// `None` or an unknown name yields the default provider; an empty
    /// registry is an error.
    pub fn get(&self, name: Option<&str>) -> Result<Arc<dyn MusicProvider>> {
        if let Some(name) = name {
            if let Some(provider) = self.providers.iter().find(|p| p.name() == name) {
                return Ok(Arc::clone(provider));
            }
            warn!(provider = %name, "Unknown provider, using default");
        }

        self.providers
            .first()
            .cloned()
            .ok_or(ArchiveError::NoProviders)
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubProvider(&'static str);

    #[async_trait]
    impl MusicProvider for StubProvider {
        fn name(&self) -> &str {
            self.0
        }

        async fn search(&self, _: &str, _: usize, _: &HashSet<String>) -> Result<Vec<Album>> {
            Ok(Vec::new())
        }

        async fn get_album_details(&self, id: &str) -> Result<AlbumDetails> {
            Err(ArchiveError::NoAudioFiles(id.to_string()))
        }

        async fn get_stream_url(&self, track_id: &str) -> Result<String> {
            Ok(format!("stub://{track_id}"))
        }

        async fn get_album_art(&self, _: &str) -> Result<Option<String>> {
            Ok(None)
        }
    }

    #[test]
    fn empty_registry_is_an_error() {
        let registry = ProviderRegistry::new();
        assert!(matches!(registry.get(None), Err(ArchiveError::NoProviders)));
        assert!(matches!(registry.get(Some("x")), Err(ArchiveError::NoProviders)));
    }

    #[test]
    fn lookup_by_name_with_default_fallback() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(StubProvider("first")));
        registry.register(Arc::new(StubProvider("second")));

        assert_eq!(registry.get(None).unwrap().name(), "first");
        assert_eq!(registry.get(Some("second")).unwrap().name(), "second");
        assert_eq!(registry.get(Some("missing")).unwrap().name(), "first");
    }

    #[test]
    fn re_registering_keeps_position() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(StubProvider("first")));
        registry.register(Arc::new(StubProvider("second")));
        registry.register(Arc::new(StubProvider("first")));

        assert_eq!(registry.names(), ["first", "second"]);
    }

    #[test]
    fn defaults_register_the_archive() {
        let registry = ProviderRegistry::with_defaults(ArchiveConfig::default()).unwrap();
        assert_eq!(registry.names(), ["Internet Archive"]);
    }
}
