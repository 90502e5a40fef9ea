use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tube_harvest::config::{
    Config, CrawlerConfig, OutputConfig, PlatformConfig, RendererConfig, RendererKind,
    UserAgentConfig,
};
use tube_harvest::crawler::{run_crawl, Coordinator, CrawlCounters, VideoProcessor};
use tube_harvest::discovery::{HttpRenderer, LandingPageSource};
use tube_harvest::providers::WatchPageClient;
use tube_harvest::storage::{open_store, RecordStore, SqliteStore};
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TRANSCRIPT_XML: &str = r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0" dur="1.2">hi</text><text start="1.2" dur="2.4">there</text></transcript>"#;

/// Creates a test configuration pointing every endpoint at the mock server
fn create_test_config(base_url: &str, db_path: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            landing_url: format!("{}/", base_url),
            max_concurrent_videos: 2,
            queue_capacity: 4,
            min_discovery_interval: 5, // Very short for testing
            shutdown_grace_period: 5_000,
            progress_interval: 10,
        },
        renderer: RendererConfig {
            kind: RendererKind::Http,
            endpoint: None,
            token: None,
            settle_time: 0,
            settle_selector: None,
            request_timeout: 5_000,
        },
        platform: PlatformConfig {
            base_url: base_url.to_string(),
            transcript_languages: vec!["en".to_string()],
            request_timeout: 5_000,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            database_path: db_path.to_string_lossy().into_owned(),
        },
    }
}

/// Watch page embedding a player response with an optional English track
fn watch_page(title: &str, track_url: Option<&str>) -> String {
    let tracks = match track_url {
        Some(url) => format!(r#"[{{"baseUrl":"{}","languageCode":"en"}}]"#, url),
        None => "[]".to_string(),
    };

    format!(
        r#"<html><body><script>var ytInitialPlayerResponse = {{"playabilityStatus":{{"status":"OK"}},"videoDetails":{{"title":"{title}","author":"A","shortDescription":"D","viewCount":"10"}},"microformat":{{"playerMicroformatRenderer":{{"publishDate":"2024-01-01"}}}},"captions":{{"playerCaptionsTracklistRenderer":{{"captionTracks":{tracks}}}}}}};</script></body></html>"#
    )
}

async fn mount_landing_page(server: &MockServer, links: &[&str]) {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">video</a>"#, href))
        .collect();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<html><body><a href="/feed/trending">Trending</a>{}</body></html>"#,
            anchors
        )))
        .mount(server)
        .await;
}

async fn mount_video(server: &MockServer, id: &str, title: &str, with_track: bool) {
    let track_url = format!("{}/api/timedtext?v={}&lang=en&fmt=srv3", server.uri(), id);
    let html = watch_page(title, with_track.then_some(track_url.as_str()));

    // Metadata and transcript each load the watch page once
    Mock::given(method("GET"))
        .and(path("/watch"))
        .and(query_param("v", id))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .expect(2)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/timedtext"))
        .and(query_param("v", id))
        .respond_with(ResponseTemplate::new(200).set_body_string(TRANSCRIPT_XML))
        .mount(server)
        .await;
}

/// Polls until `condition` holds or five seconds pass
async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test]
async fn test_full_harvest_single_video() {
    let server = MockServer::start().await;
    mount_landing_page(&server, &["/watch?v=abc123"]).await;
    mount_video(&server, "abc123", "T", true).await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("videos.db");
    let config = create_test_config(&server.uri(), &db_path);

    let reader = SqliteStore::new(&db_path).expect("Failed to open database");
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(run_crawl(config, shutdown.clone()));

    wait_for(|| reader.count_records().unwrap_or(0) == 1).await;
    // Keep discovering the same link for a while
    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.cancel();

    let snapshot = handle
        .await
        .expect("crawl task panicked")
        .expect("crawl failed");
    assert_eq!(snapshot.dispatched, 1);
    assert_eq!(snapshot.stored, 1);
    assert!(snapshot.already_visited >= 1);

    let store = open_store(&db_path).expect("Failed to reopen database");
    assert_eq!(store.count_records().unwrap(), 1);

    let stored = store.get_record(1).unwrap();
    assert_eq!(stored.record.title, "T");
    assert_eq!(stored.record.author, "A");
    assert_eq!(stored.record.description, "D");
    assert_eq!(stored.record.views, 10);
    assert_eq!(
        stored.record.publish_date.map(|d| d.to_string()),
        Some("2024-01-01".to_string())
    );
    assert_eq!(stored.record.subtitles, "hi\nthere");
}

#[tokio::test]
async fn test_failed_video_does_not_affect_others() {
    let server = MockServer::start().await;
    mount_landing_page(&server, &["/watch?v=nocaps1", "/watch?v=good123&t=5s"]).await;
    mount_video(&server, "nocaps1", "No captions", false).await;
    mount_video(&server, "good123", "Good", true).await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("videos.db");
    let config = create_test_config(&server.uri(), &db_path);

    let store = Arc::new(SqliteStore::new(&db_path).expect("Failed to open database"));
    let client = Arc::new(WatchPageClient::new(&config.platform, &config.user_agent).unwrap());
    let counters = Arc::new(CrawlCounters::new());
    let processor = VideoProcessor::new(client.clone(), client, store.clone(), counters.clone());

    let renderer = HttpRenderer::new(&config.renderer, &config.user_agent).unwrap();
    let discovery = Arc::new(LandingPageSource::new(
        Box::new(renderer),
        Url::parse(&config.crawler.landing_url).unwrap(),
    ));

    let coordinator = Coordinator::new(&config.crawler, discovery, processor);
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(coordinator.run(shutdown.clone()));

    wait_for(|| {
        let snapshot = counters.snapshot();
        snapshot.stored == 1 && snapshot.failed == 1
    })
    .await;
    shutdown.cancel();
    let snapshot = handle.await.expect("crawl task panicked");

    assert_eq!(snapshot.dispatched, 2);
    assert_eq!(store.count_records().unwrap(), 1);

    let recent = store.recent_records(10).unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].record.title, "Good");
    assert_eq!(recent[0].record.subtitles, "hi\nthere");
}

#[tokio::test]
async fn test_landing_page_failure_keeps_crawling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("videos.db");
    let config = create_test_config(&server.uri(), &db_path);

    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(run_crawl(config, shutdown.clone()));
    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown.cancel();

    let snapshot = handle.await.unwrap().unwrap();
    assert!(snapshot.discovery_calls >= 2);
    assert!(snapshot.empty_discoveries >= 1);
    assert_eq!(snapshot.dispatched, 0);
}
