//! Internet Archive provider.

use crate::client::ArchiveClient;
use crate::config::ArchiveConfig;
use crate::error::{ArchiveError, Result};
use crate::hydrate;
use crate::paging;
use crate::pool::run_concurrent;
use crate::provider::MusicProvider;
use crate::types::SearchDoc;
use async_trait::async_trait;
use needledrop_core::{Album, AlbumDetails, Genre, Sides};
use std::collections::HashSet;
use tracing::{debug, info, warn};

const PROVIDER_NAME: &str = "Internet Archive";

const UNKNOWN_ALBUM: &str = "Unknown Album";
const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_GENRE: &str = "Unknown";

/// Archive query for a genre id; unknown genres get the catch-all query.
pub fn genre_query(genre: &str) -> &'static str {
    match genre {
        "jazz" => "subject:(jazz) AND mediatype:(audio)",
        "classical" => "subject:(classical OR orchestral OR symphony) AND mediatype:(audio)",
        "blues" => "subject:(blues) AND mediatype:(audio)",
        "folk" => "subject:(folk OR traditional) AND mediatype:(audio)",
        "world" => "subject:(world music OR ethnic OR traditional) AND mediatype:(audio)",
        "gospel" => "subject:(gospel OR spiritual OR hymn) AND mediatype:(audio)",
        "spoken" => "subject:(spoken word OR poetry OR speech) AND mediatype:(audio)",
        _ => "mediatype:(audio)",
    }
}

/// Sources crates from archive.org (or anything speaking its API).
pub struct InternetArchiveProvider {
    client: ArchiveClient,
}

impl InternetArchiveProvider {
    pub fn new(config: ArchiveConfig) -> Result<Self> {
        Ok(Self {
            client: ArchiveClient::new(config)?,
        })
    }

    fn config(&self) -> &ArchiveConfig {
        self.client.config()
    }

    /// Corpus size for `query`, or the configured fallback if the count
    /// query fails in any way.
    async fn estimate_corpus(&self, query: &str) -> u64 {
        match self.client.count(query).await {
            Ok(num_found) => num_found,
            Err(e) => {
                let fallback = self.config().fallback_corpus_size;
                warn!(error = %e, fallback, "Corpus size estimate failed, assuming fallback");
                fallback
            }
        }
    }

    /// Hydrate one search hit into a playable album.
    async fn build_album_from_doc(&self, doc: &SearchDoc, genre: &str) -> Result<Album> {
        let item = self.client.metadata(&doc.identifier).await?;
        let config = self.config();

        let tracks = hydrate::build_tracks(config, &doc.identifier, &item.files);
        if tracks.is_empty() {
            return Err(ArchiveError::NoAudioFiles(doc.identifier.clone()));
        }

        Ok(Album {
            id: doc.identifier.clone(),
            title: doc.title.clone().unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
            artist: doc.creator.clone().unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            year: doc.release_year(),
            genre: genre.to_string(),
            cover_art_url: Some(hydrate::cover_art_url(config, &doc.identifier, &item.files)),
            sides: Sides::split(tracks),
            source_url: format!("{}/{}", config.details_url(), doc.identifier),
            provider: PROVIDER_NAME.to_string(),
        })
    }
}

#[async_trait]
impl MusicProvider for InternetArchiveProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn search(
        &self,
        genre: &str,
        count: usize,
        exclude_ids: &HashSet<String>,
    ) -> Result<Vec<Album>> {
        let config = self.config();
        let query = genre_query(genre);
        if Genre::find(genre).is_none() {
            debug!(genre = %genre, "Unknown genre, searching everything");
        }

        let rows = paging::fetch_count(count, exclude_ids.len(), config.page_margin);
        let num_found = self.estimate_corpus(query).await;
        let max_page = paging::max_page(num_found, rows, config.max_page);
        let page = paging::pick_page(&mut rand::thread_rng(), max_page);

        debug!(
            genre = %genre,
            num_found,
            rows,
            max_page,
            page,
            "Picked search page"
        );

        let docs = self.client.search_page(query, rows, page).await?;

        let candidates: Vec<SearchDoc> = docs
            .into_iter()
            .filter(|doc| !exclude_ids.contains(&doc.identifier))
            .take(count)
            .collect();

        let albums = run_concurrent(&candidates, config.concurrency, |doc| {
            self.build_album_from_doc(doc, genre)
        })
        .await;

        info!(
            genre = %genre,
            requested = count,
            candidates = candidates.len(),
            albums = albums.len(),
            "Crate sourced"
        );

        Ok(albums)
    }

    async fn get_album_details(&self, id: &str) -> Result<AlbumDetails> {
        let item = self.client.metadata(id).await?;
        let config = self.config();
        let info = item.metadata;

        let tracks = hydrate::build_tracks(config, id, &item.files);
        debug!(id = %id, tracks = tracks.len(), "Fetched album details");

        let album = Album {
            id: id.to_string(),
            title: info.title.clone().unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
            artist: info.creator.clone().unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            year: info.release_year(),
            genre: info.subject.clone().unwrap_or_else(|| UNKNOWN_GENRE.to_string()),
            cover_art_url: Some(hydrate::cover_art_url(config, id, &item.files)),
            sides: Sides::split(tracks),
            source_url: format!("{}/{}", config.details_url(), id),
            provider: PROVIDER_NAME.to_string(),
        };

        Ok(AlbumDetails {
            album,
            description: info.description,
        })
    }

    async fn get_stream_url(&self, track_id: &str) -> Result<String> {
        Ok(format!("{}/{}", self.config().download_url(), track_id))
    }

    async fn get_album_art(&self, id: &str) -> Result<Option<String>> {
        Ok(Some(format!("{}/{}", self.config().image_service_url(), id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_genres_have_dedicated_queries() {
        assert_eq!(genre_query("jazz"), "subject:(jazz) AND mediatype:(audio)");
        assert!(genre_query("gospel").contains("hymn"));
    }

    #[test]
    fn unknown_genre_falls_back_to_surprise() {
        assert_eq!(genre_query("polka"), genre_query(Genre::SURPRISE));
        assert_eq!(genre_query(""), "mediatype:(audio)");
    }

    #[test]
    fn every_catalogue_genre_maps_to_an_audio_query() {
        for genre in needledrop_core::GENRES {
            assert!(genre_query(genre.id).ends_with("mediatype:(audio)"));
        }
    }

    #[tokio::test]
    async fn derived_urls() {
        let provider = InternetArchiveProvider::new(ArchiveConfig::default()).unwrap();
        assert_eq!(
            provider.get_stream_url("item/01.mp3").await.unwrap(),
            "https://archive.org/download/item/01.mp3"
        );
        assert_eq!(
            provider.get_album_art("item").await.unwrap().as_deref(),
            Some("https://archive.org/services/img/item")
        );
    }
}
