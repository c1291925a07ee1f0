//! Decoded buffer cache keyed by stream URL

use crate::decoder::{extension_hint, AudioDecoder};
use crate::error::Result;
use crate::fetch::AudioFetcher;
use needledrop_core::AudioBuffer;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Fetch-and-decode cache
///
/// Entries live as long as the cache; there is no eviction.
pub struct BufferCache {
    fetcher: Arc<dyn AudioFetcher>,
    decoder: Arc<dyn AudioDecoder>,
    buffers: HashMap<String, Arc<AudioBuffer>>,
}

impl BufferCache {
    pub fn new(fetcher: Arc<dyn AudioFetcher>, decoder: Arc<dyn AudioDecoder>) -> Self {
        Self {
            fetcher,
            decoder,
            buffers: HashMap::new(),
        }
    }

    /// Return the decoded buffer for `url`, fetching and decoding on a miss
    pub async fn get(&mut self, url: &str) -> Result<Arc<AudioBuffer>> {
        if let Some(buffer) = self.buffers.get(url) {
            debug!(url, "Buffer cache hit");
            return Ok(Arc::clone(buffer));
        }

        let bytes = self.fetcher.fetch(url).await?;
        let extension = extension_hint(url);
        let buffer = Arc::new(self.decoder.decode(&bytes, extension.as_deref())?);

        self.buffers.insert(url.to_string(), Arc::clone(&buffer));
        Ok(buffer)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.buffers.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlaybackError;
    use async_trait::async_trait;
    use needledrop_core::{AudioFormat, SampleRate};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AudioFetcher for CountingFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if url.contains("missing") {
                return Err(PlaybackError::Fetch("HTTP 404".to_string()));
            }
            Ok(vec![0; 4])
        }
    }

    struct SilenceDecoder;

    impl AudioDecoder for SilenceDecoder {
        fn decode(&self, _bytes: &[u8], _extension: Option<&str>) -> Result<AudioBuffer> {
            Ok(AudioBuffer::new(
                vec![0.0; 88_200],
                AudioFormat::stereo(SampleRate::CD_QUALITY),
            ))
        }
    }

    #[tokio::test]
    async fn second_get_is_served_from_cache() {
        let fetcher = Arc::new(CountingFetcher::default());
        let mut cache = BufferCache::new(fetcher.clone(), Arc::new(SilenceDecoder));

        let first = cache.get("https://a/one.mp3").await.unwrap();
        let second = cache.get("https://a/one.mp3").await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let fetcher = Arc::new(CountingFetcher::default());
        let mut cache = BufferCache::new(fetcher.clone(), Arc::new(SilenceDecoder));

        assert!(cache.get("https://a/missing.mp3").await.is_err());
        assert!(cache.get("https://a/missing.mp3").await.is_err());

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }
}
