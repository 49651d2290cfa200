//! Integration tests for run_batch with the generic searcher.
//!
//! A wiremock server plays both the search portal (JSON search results) and
//! the stream hosts (playlists that are live, dead or not playlists at all),
//! so the whole pipeline runs without real network access.

mod helpers;

use helpers::{create_test_config, read_rows, write_channel_list};
use iptv_scout::run_batch;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIVE_PLAYLIST: &str = "#EXTM3U\n#EXT-X-VERSION:3\n#EXTINF:10,\nseg1.ts\n";

async fn mount_search(server: &MockServer, keyword: &str, streams: &[(&str, &str)]) {
    let results: Vec<_> = streams
        .iter()
        .map(|(name, stream)| {
            json!({
                "name": name,
                "url": format!("{}/live/{}", server.uri(), stream),
                "resolution": "1920x1080",
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", keyword))
        .and(query_param("p", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": results })))
        .mount(server)
        .await;
}

/// Mounts live playlists, dead links and the empty fallback search page.
async fn mount_common(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/live/ok-.*\.m3u8$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LIVE_PLAYLIST))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/live/html-.*\.m3u8$"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/live/dead-.*\.m3u8$"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
    // Any other search page is empty, which ends paging.
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_run_batch_writes_validated_playlist_in_input_order() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        "CCTV-1",
        &[
            ("CCTV-1", "ok-cctv1-a.m3u8"),
            ("CCTV-1", "dead-cctv1-b.m3u8"),
            ("CCTV-1 综合", "ok-cctv1-c.m3u8"),
            ("CCTV-1", "html-cctv1-d.m3u8"),
        ],
    )
    .await;
    mount_search(&server, "CCTV-2", &[("CCTV-2", "ok-cctv2-a.m3u8")]).await;
    mount_common(&server).await;

    let input = write_channel_list("#News\nCCTV-1\nCCTV-2\n\n#Local\nBTV\n");
    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("result.txt");
    let mut config = create_test_config(input.path(), output.clone(), "generic");
    config.search_url = Some(format!("{}/search?q={{keyword}}&p={{page}}", server.uri()));

    let report = run_batch(config).await.expect("run_batch should succeed");

    let base = server.uri();
    let rows = read_rows(&output);
    assert_eq!(rows.len(), 5, "rows: {:?}", rows);
    assert_eq!(rows[0], "News,#genre#");
    assert!(rows[1].starts_with("更新时间("), "timestamp row: {}", rows[1]);
    assert!(rows[1].ends_with(&format!(",{}/live/ok-cctv1-a.m3u8", base)));
    assert_eq!(rows[2], format!("CCTV-1,{}/live/ok-cctv1-a.m3u8", base));
    assert_eq!(rows[3], format!("CCTV-1,{}/live/ok-cctv1-c.m3u8", base));
    assert_eq!(rows[4], format!("CCTV-2,{}/live/ok-cctv2-a.m3u8", base));

    assert_eq!(report.groups, 2);
    assert_eq!(report.channels, 3);
    assert_eq!(report.channels_with_links, 2);
    assert_eq!(report.links_written, 4);
    assert_eq!(report.searcher, "generic");
    assert_eq!(
        report.stats.warnings.get("Channel without valid links"),
        Some(&1)
    );
}

#[tokio::test]
async fn test_run_batch_without_validation_keeps_every_candidate() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        "CCTV-5",
        &[("CCTV-5", "ok-a.m3u8"), ("CCTV-5", "dead-b.m3u8")],
    )
    .await;
    mount_common(&server).await;

    let input = write_channel_list("#Sports\nCCTV-5\n");
    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("result.txt");
    let mut config = create_test_config(input.path(), output.clone(), "generic");
    config.search_url = Some(format!("{}/search?q={{keyword}}&p={{page}}", server.uri()));
    config.no_validation = true;

    let report = run_batch(config).await.expect("run_batch should succeed");
    assert_eq!(report.links_written, 3);
    let rows = read_rows(&output);
    assert!(rows[3].ends_with("/live/dead-b.m3u8"));
}

#[tokio::test]
async fn test_run_batch_survives_failing_search_portal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let input = write_channel_list("#News\nCCTV-1\n");
    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("result.txt");
    let mut config = create_test_config(input.path(), output.clone(), "generic");
    config.search_url = Some(format!("{}/search?q={{keyword}}&p={{page}}", server.uri()));

    let report = run_batch(config).await.expect("transport failures must not fail the run");
    assert_eq!(report.channels_with_links, 0);
    // Header and placeholder timestamp row only.
    let rows = read_rows(&output);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], "News,#genre#");
    assert!(rows[1].ends_with(",http://placeholder.example/timestamp.m3u8"));
    assert_eq!(
        report.stats.errors.get("Search request status error"),
        Some(&1)
    );
}

#[tokio::test]
async fn test_run_batch_writes_summary_json() {
    let server = MockServer::start().await;
    mount_search(&server, "BTV", &[("BTV", "ok-btv.m3u8")]).await;
    mount_common(&server).await;

    let input = write_channel_list("#Local\nBTV\n");
    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("result.txt");
    let summary = dir.path().join("summary.json");
    let mut config = create_test_config(input.path(), output, "generic");
    config.search_url = Some(format!("{}/search?q={{keyword}}&p={{page}}", server.uri()));
    config.summary_json = Some(summary.clone());

    run_batch(config).await.expect("run_batch should succeed");

    let text = std::fs::read_to_string(&summary).expect("summary written");
    let value: serde_json::Value = serde_json::from_str(&text).expect("valid JSON");
    assert_eq!(value["searcher"], "generic");
    assert_eq!(value["channels"], 1);
    assert_eq!(value["channels_with_links"], 1);
    assert_eq!(value["links_written"], 2);
}

#[tokio::test]
async fn test_run_batch_missing_input_fails() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(
        &dir.path().join("missing.txt"),
        dir.path().join("result.txt"),
        "generic",
    );
    let err = run_batch(config).await.expect_err("missing input must fail");
    assert!(err.to_string().contains("Channel list not found"), "{:#}", err);
}
