//! Integration tests for crate sourcing against a mock archive.
//!
//! These tests use mock servers to verify paging, deduplication and
//! hydration without touching the real archive.

use needledrop_archive::{ArchiveConfig, ArchiveError, InternetArchiveProvider, MusicProvider};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::time::Duration;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

// =============================================================================
// Helpers
// =============================================================================

const PAGE_FIELDS: &str = "identifier,title,creator,date,year,subject";

fn provider(server: &MockServer) -> InternetArchiveProvider {
    InternetArchiveProvider::new(ArchiveConfig::new(server.uri())).expect("valid config")
}

fn ids(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{prefix}-{i:02}")).collect()
}

fn search_body(num_found: u64, ids: &[String]) -> Value {
    let docs: Vec<Value> = ids
        .iter()
        .map(|id| {
            json!({
                "identifier": id,
                "title": format!("Title of {id}"),
                "creator": "Some Band",
                "date": "1958-01-01T00:00:00Z"
            })
        })
        .collect();
    json!({ "response": { "numFound": num_found, "docs": docs } })
}

fn metadata_body(audio_files: usize) -> Value {
    let mut files: Vec<Value> = (1..=audio_files)
        .map(|n| json!({ "name": format!("{n:02} Song.mp3"), "length": "180.5", "format": "VBR MP3" }))
        .collect();
    files.push(json!({ "name": "01 Song.flac", "format": "Flac" }));
    files.push(json!({ "name": "cover.jpg", "format": "JPEG" }));
    json!({ "metadata": { "title": "Meta Title" }, "files": files })
}

async fn mount_count(server: &MockServer, num_found: u64) {
    Mock::given(method("GET"))
        .and(path("/advancedsearch.php"))
        .and(query_param("rows", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": { "numFound": num_found, "docs": [] }
        })))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, ids: &[String]) {
    Mock::given(method("GET"))
        .and(path("/advancedsearch.php"))
        .and(query_param("fl", PAGE_FIELDS))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(999, ids)))
        .mount(server)
        .await;
}

async fn mount_all_metadata(server: &MockServer, audio_files: usize) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/metadata/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(metadata_body(audio_files)))
        .mount(server)
        .await;
}

async fn page_requests(server: &MockServer) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.query_pairs().any(|(k, v)| k == "fl" && v == PAGE_FIELDS))
        .collect()
}

fn param(request: &Request, name: &str) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

// =============================================================================
// Search Tests
// =============================================================================

mod search {
    use super::*;

    #[tokio::test]
    async fn jazz_scenario_pages_within_corpus() {
        let server = MockServer::start().await;
        mount_count(&server, 500).await;
        mount_page(&server, &ids("jazz", 30)).await;
        mount_all_metadata(&server, 5).await;

        let albums = provider(&server)
            .search("jazz", 20, &HashSet::new())
            .await
            .expect("search succeeds");

        assert_eq!(albums.len(), 20);
        for album in &albums {
            assert!(album.track_count() >= 1);
            assert_eq!(album.sides.a.len(), 3);
            assert_eq!(album.sides.b.len(), 2);
            assert_eq!(album.genre, "jazz");
            assert_eq!(album.provider, "Internet Archive");
            assert_eq!(album.year.as_deref(), Some("1958"));
        }

        let requests = page_requests(&server).await;
        assert_eq!(requests.len(), 1);
        assert_eq!(param(&requests[0], "rows").as_deref(), Some("30"));
        assert_eq!(param(&requests[0], "sort").as_deref(), Some("downloads desc"));
        assert_eq!(
            param(&requests[0], "q").as_deref(),
            Some("subject:(jazz) AND mediatype:(audio)")
        );
        let page: u64 = param(&requests[0], "page").unwrap().parse().unwrap();
        assert!((1..=16).contains(&page), "page {page} outside [1, 16]");
    }

    #[tokio::test]
    async fn excluded_albums_never_return() {
        let server = MockServer::start().await;
        let all = ids("seen", 12);
        mount_count(&server, 100).await;
        mount_page(&server, &all).await;
        mount_all_metadata(&server, 2).await;

        let exclude: HashSet<String> = all.iter().step_by(2).cloned().collect();
        let albums = provider(&server)
            .search("blues", 20, &exclude)
            .await
            .unwrap();

        assert_eq!(albums.len(), 6);
        assert!(albums.iter().all(|a| !exclude.contains(&a.id)));

        // rows = count + excluded + margin
        let requests = page_requests(&server).await;
        assert_eq!(param(&requests[0], "rows").as_deref(), Some("36"));
    }

    #[tokio::test]
    async fn results_are_truncated_to_count() {
        let server = MockServer::start().await;
        mount_count(&server, 10_000).await;
        mount_page(&server, &ids("many", 15)).await;
        mount_all_metadata(&server, 1).await;

        let albums = provider(&server)
            .search("folk", 4, &HashSet::new())
            .await
            .unwrap();
        assert_eq!(albums.len(), 4);
    }

    #[tokio::test]
    async fn count_failure_uses_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/advancedsearch.php"))
            .and(query_param("rows", "0"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_page(&server, &ids("fallback", 3)).await;
        mount_all_metadata(&server, 1).await;

        let albums = provider(&server)
            .search("classical", 20, &HashSet::new())
            .await
            .expect("count failure is not fatal");
        assert_eq!(albums.len(), 3);

        // fallback corpus of 1000 at 30 rows per page
        let requests = page_requests(&server).await;
        let page: u64 = param(&requests[0], "page").unwrap().parse().unwrap();
        assert!((1..=33).contains(&page));
    }

    #[tokio::test]
    async fn malformed_count_uses_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/advancedsearch.php"))
            .and(query_param("rows", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
            .mount(&server)
            .await;
        mount_page(&server, &ids("fallback", 2)).await;
        mount_all_metadata(&server, 1).await;

        let albums = provider(&server)
            .search("world", 20, &HashSet::new())
            .await
            .unwrap();
        assert_eq!(albums.len(), 2);
    }

    #[tokio::test]
    async fn primary_query_failure_is_fatal() {
        let server = MockServer::start().await;
        mount_count(&server, 500).await;
        Mock::given(method("GET"))
            .and(path("/advancedsearch.php"))
            .and(query_param("fl", PAGE_FIELDS))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = provider(&server).search("jazz", 20, &HashSet::new()).await;
        match result {
            Err(ArchiveError::Status { status, .. }) => assert_eq!(status, 503),
            other => panic!("Expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_page_is_a_valid_result() {
        let server = MockServer::start().await;
        mount_count(&server, 0).await;
        mount_page(&server, &[]).await;

        let albums = provider(&server)
            .search("spoken", 20, &HashSet::new())
            .await
            .unwrap();
        assert!(albums.is_empty());

        let requests = page_requests(&server).await;
        assert_eq!(param(&requests[0], "page").as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn unknown_genre_searches_everything() {
        let server = MockServer::start().await;
        mount_count(&server, 10).await;
        mount_page(&server, &[]).await;

        provider(&server)
            .search("polka", 20, &HashSet::new())
            .await
            .unwrap();

        let requests = page_requests(&server).await;
        assert_eq!(param(&requests[0], "q").as_deref(), Some("mediatype:(audio)"));
    }
}

// =============================================================================
// Hydration Tests
// =============================================================================

mod hydration {
    use super::*;

    #[tokio::test]
    async fn failed_candidates_are_dropped() {
        let server = MockServer::start().await;
        let all = ids("mixed", 4);
        mount_count(&server, 100).await;
        mount_page(&server, &all).await;

        // mixed-00: fine, mixed-01: 404, mixed-02: no audio, mixed-03: fine
        for (id, response) in [
            (&all[0], ResponseTemplate::new(200).set_body_json(metadata_body(3))),
            (&all[1], ResponseTemplate::new(404)),
            (
                &all[2],
                ResponseTemplate::new(200).set_body_json(json!({
                    "files": [{ "name": "scan.pdf" }, { "name": "cover.jpg" }]
                })),
            ),
            (&all[3], ResponseTemplate::new(200).set_body_json(metadata_body(1))),
        ] {
            Mock::given(method("GET"))
                .and(path(format!("/metadata/{id}")))
                .respond_with(response)
                .mount(&server)
                .await;
        }

        let albums = provider(&server)
            .search("gospel", 20, &HashSet::new())
            .await
            .unwrap();

        let mut found: Vec<&str> = albums.iter().map(|a| a.id.as_str()).collect();
        found.sort_unstable();
        assert_eq!(found, ["mixed-00", "mixed-03"]);

        let single = albums.iter().find(|a| a.id == "mixed-03").unwrap();
        assert_eq!(single.sides.a.len(), 1);
        assert!(single.sides.b.is_empty());
    }

    #[tokio::test]
    async fn slow_candidates_time_out_and_are_dropped() {
        let server = MockServer::start().await;
        let all = ids("slow", 2);
        mount_count(&server, 100).await;
        mount_page(&server, &all).await;

        Mock::given(method("GET"))
            .and(path(format!("/metadata/{}", all[0])))
            .respond_with(ResponseTemplate::new(200).set_body_json(metadata_body(2)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/metadata/{}", all[1])))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(metadata_body(2))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let mut config = ArchiveConfig::new(server.uri());
        config.timeout_secs = 1;
        let provider = InternetArchiveProvider::new(config).unwrap();

        let albums = provider.search("jazz", 20, &HashSet::new()).await.unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].id, "slow-00");
    }

    #[tokio::test]
    async fn album_fields_are_derived_from_doc_and_files() {
        let server = MockServer::start().await;
        mount_count(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/advancedsearch.php"))
            .and(query_param("fl", PAGE_FIELDS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": { "numFound": 1, "docs": [{ "identifier": "bare-item" }] }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/metadata/bare-item"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "files": [
                    { "name": "side_one-opener.ogg", "length": "2:30" },
                    { "name": "extra.flac" }
                ]
            })))
            .mount(&server)
            .await;

        let albums = provider(&server)
            .search("folk", 20, &HashSet::new())
            .await
            .unwrap();
        let album = &albums[0];
        let base = server.uri();

        assert_eq!(album.title, "Unknown Album");
        assert_eq!(album.artist, "Unknown Artist");
        assert_eq!(album.year, None);
        assert_eq!(album.source_url, format!("{base}/details/bare-item"));
        assert_eq!(
            album.cover_art_url.as_deref(),
            Some(format!("{base}/services/img/bare-item").as_str())
        );

        let track = &album.sides.a.tracks[0];
        assert_eq!(track.id, "bare-item/side_one-opener.ogg");
        assert_eq!(track.title, "side one opener");
        assert_eq!(track.duration, Some(150.0));
        assert_eq!(
            track.stream_url,
            format!("{base}/download/bare-item/side_one-opener.ogg")
        );
    }
}

// =============================================================================
// Album Details Tests
// =============================================================================

mod details {
    use super::*;

    #[tokio::test]
    async fn details_include_description_and_subject() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metadata/live1961"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "metadata": {
                    "title": "Live at the Vanguard",
                    "creator": ["Trio", "Guest"],
                    "date": "1961-06-25",
                    "subject": ["jazz", "live"],
                    "description": "Recorded on a Sunday."
                },
                "files": [
                    { "name": "01.mp3" }, { "name": "02.mp3" }, { "name": "03.mp3" },
                    { "name": "front.png" }
                ]
            })))
            .mount(&server)
            .await;

        let details = provider(&server).get_album_details("live1961").await.unwrap();

        assert_eq!(details.album.title, "Live at the Vanguard");
        assert_eq!(details.album.artist, "Trio");
        assert_eq!(details.album.year.as_deref(), Some("1961"));
        assert_eq!(details.album.genre, "jazz");
        assert_eq!(details.description.as_deref(), Some("Recorded on a Sunday."));
        assert_eq!(details.album.sides.a.len(), 2);
        assert_eq!(details.album.sides.b.len(), 1);
        assert!(details
            .album
            .cover_art_url
            .as_deref()
            .unwrap()
            .ends_with("/download/live1961/front.png"));
    }

    #[tokio::test]
    async fn details_without_metadata_use_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metadata/empty"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let details = provider(&server).get_album_details("empty").await.unwrap();
        assert_eq!(details.album.genre, "Unknown");
        assert_eq!(details.album.track_count(), 0);
        assert!(details.description.is_none());
    }

    #[tokio::test]
    async fn details_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metadata/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = provider(&server).get_album_details("gone").await;
        assert!(matches!(result, Err(ArchiveError::Status { status: 404, .. })));
    }
}
