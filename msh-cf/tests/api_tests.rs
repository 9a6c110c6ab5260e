//! Integration tests for msh-cf API endpoints
//!
//! Tests cover:
//! - Health and build info endpoints
//! - Batch track annotation, summary and recommendations
//! - Playlist discovery with fallback substitution
//! - Live play/skip gate
//! - Request validation and JSON error bodies
//! - Compliance entries reaching the event bus and JSON-lines file

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

use msh_cf::{build_router, AppState};
use msh_common::config::TomlConfig;

/// Test helper: Create app with compiled default configuration
fn setup_app() -> axum::Router {
    let state = AppState::from_config(&TomlConfig::default()).expect("Should build state");
    build_router(state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    post_raw(uri, body.to_string())
}

fn post_raw(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Test helper: Wait for the background log writer to flush `expected` lines
async fn read_log_lines(path: &std::path::Path, expected: usize) -> Vec<String> {
    for _ in 0..100 {
        if let Ok(text) = tokio::fs::read_to_string(path).await {
            let lines: Vec<String> = text.lines().map(str::to_string).collect();
            if lines.len() >= expected {
                return lines;
            }
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    panic!("{} never reached {} lines", path.display(), expected);
}

// =============================================================================
// Health / Build Info
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let response = setup_app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "msh-cf");
    assert!(body["version"].is_string());
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_api_health_alias() {
    let response = setup_app().oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let response = setup_app().oneshot(get("/api/buildinfo")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(body["version"].is_string());
    assert!(body["git_hash"].is_string());
    assert!(body["build_timestamp"].is_string());
    assert!(body["build_profile"].is_string());
}

// =============================================================================
// Batch Content Filter
// =============================================================================

#[tokio::test]
async fn test_content_filter_annotates_every_track() {
    let request = post_json(
        "/api/content-filter",
        json!({
            "tracks": [
                {"id": "a", "name": "Nocturne", "explicit": false,
                 "artists": [{"name": "Classical Masters"}], "popularity": 42},
                {"id": "b", "name": "Party Anthem", "explicit": true,
                 "artists": [{"name": "DJ Loud"}]}
            ],
            "userInfo": {"id": "student-1"},
            "accessToken": "secret"
        }),
    );
    let response = setup_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let tracks = body["filteredTracks"].as_array().unwrap();
    assert_eq!(tracks.len(), 2);

    // Input fields survive, annotations are added
    assert_eq!(tracks[0]["id"], "a");
    assert_eq!(tracks[0]["popularity"], 42);
    assert_eq!(tracks[0]["cipaCompliant"], true);
    assert_eq!(
        tracks[0]["educationalContext"],
        "Approved for educational music study platform"
    );
    assert_eq!(tracks[0]["contentAnalysis"]["educationalValue"], 10);
    assert_eq!(tracks[0]["contentAnalysis"]["riskLevel"], "low");

    // Explicit track is medium risk but still admitted; keywords never block tracks
    assert_eq!(tracks[1]["contentAnalysis"]["isExplicit"], true);
    assert_eq!(tracks[1]["contentAnalysis"]["riskLevel"], "medium");
    assert_eq!(tracks[1]["contentAnalysis"]["admitted"], true);

    assert_eq!(body["summary"]["totalTracks"], 2);
    assert_eq!(body["summary"]["explicitTracks"], 1);
    assert_eq!(body["summary"]["educationalTracks"], 1);
    assert_eq!(body["summary"]["averageEducationalValue"], 5.0);

    assert_eq!(body["complianceInfo"]["cipaCompliant"], true);
    assert_eq!(body["complianceInfo"]["filteringActive"], true);
    assert_eq!(body["complianceInfo"]["institution"], "Music Study Hub");
    assert_eq!(
        body["complianceInfo"]["complianceStandards"],
        json!(["CIPA", "COPPA", "FERPA"])
    );
}

#[tokio::test]
async fn test_content_filter_recommendation_order() {
    let request = post_json(
        "/api/content-filter",
        json!({
            "tracks": [
                {"id": "t1", "name": "Piano Study Jazz"},
                {"id": "t2", "name": "Piano Sonata"},
                {"id": "t3", "name": "Ambient Focus Chill"},
                {"id": "t4", "name": "Road Song"}
            ]
        }),
    );
    let response = setup_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let ids: Vec<&str> = body["educationalRecommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    // Highest first, ties in input order, zero-valued excluded
    assert_eq!(ids, vec!["t1", "t3", "t2"]);
    assert_eq!(body["summary"]["averageEducationalValue"], 17.5);
}

#[tokio::test]
async fn test_content_filter_empty_batch() {
    let request = post_json("/api/content-filter", json!({"tracks": []}));
    let response = setup_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["filteredTracks"], json!([]));
    assert_eq!(body["educationalRecommendations"], json!([]));
    assert_eq!(body["summary"]["totalTracks"], 0);
    assert_eq!(body["summary"]["averageEducationalValue"], 0.0);
}

#[tokio::test]
async fn test_content_filter_requires_tracks_array() {
    let bodies = [
        json!({}).to_string(),
        json!({"tracks": "nope"}).to_string(),
        json!({"tracks": null}).to_string(),
        "not json".to_string(),
        String::new(),
    ];

    for body in bodies {
        let response = setup_app()
            .oneshot(post_raw("/api/content-filter", body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {:?}", body);

        let json = extract_json(response.into_body()).await;
        assert_eq!(json["error"], "Tracks array is required");
    }
}

#[tokio::test]
async fn test_content_filter_tolerates_mistyped_fields() {
    let request = post_json(
        "/api/content-filter",
        json!({
            "tracks": [
                {"id": 123, "name": "Classical Piano", "explicit": 1, "genres": ["jazz", null]},
                7,
                {"name": "Road Song", "artists": "nobody"}
            ]
        }),
    );
    let response = setup_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let tracks = body["filteredTracks"].as_array().unwrap();
    assert_eq!(tracks.len(), 3);

    assert_eq!(tracks[0]["id"], "123");
    assert_eq!(tracks[0]["contentAnalysis"]["isExplicit"], true);
    // classical, piano, jazz
    assert_eq!(tracks[0]["contentAnalysis"]["educationalValue"], 30);

    // A non-object element is classified as an empty track
    assert_eq!(tracks[1]["contentAnalysis"]["educationalValue"], 0);
    assert_eq!(tracks[1]["cipaCompliant"], true);

    assert_eq!(body["summary"]["totalTracks"], 3);
    assert_eq!(body["summary"]["explicitTracks"], 1);
}

// =============================================================================
// Playlist Discovery
// =============================================================================

#[tokio::test]
async fn test_discover_substitutes_fallback_when_nothing_admitted() {
    let request = post_json(
        "/api/playlists/discover",
        json!({
            "playlists": [
                {"id": "p1", "name": "Party Club Night", "description": "Chill study vibes"},
                {"id": "p2", "name": "Road Trip", "description": "Songs for the car"}
            ]
        }),
    );
    let response = setup_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["source"], "fallback");
    let playlists = body["playlists"].as_array().unwrap();
    assert_eq!(playlists.len(), 3);
    assert_eq!(playlists[0]["id"], "fallback-focus");
}

#[tokio::test]
async fn test_discover_returns_only_admitted_playlists() {
    let request = post_json(
        "/api/playlists/discover",
        json!({
            "playlists": [
                {"id": "p1", "name": "Deep Focus", "description": "Ambient instrumental"},
                {"id": "p2", "name": "Party Club Night", "description": "Chill study vibes"},
                {"id": "p3", "name": "Piano Study", "explicit": true}
            ]
        }),
    );
    let response = setup_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["source"], "live");
    let playlists = body["playlists"].as_array().unwrap();
    assert_eq!(playlists.len(), 1);
    assert_eq!(playlists[0]["id"], "p1");
    assert_eq!(playlists[0]["contentAnalysis"]["admitted"], true);
}

#[tokio::test]
async fn test_discover_requires_playlists_array() {
    let response = setup_app()
        .oneshot(post_json("/api/playlists/discover", json!({"items": []})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Playlists array is required");
}

#[tokio::test]
async fn test_fallback_catalog_endpoint() {
    let response = setup_app()
        .oneshot(get("/api/playlists/fallback"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let playlists = body["playlists"].as_array().unwrap();
    assert_eq!(playlists.len(), 3);
    for playlist in playlists {
        assert!(playlist["uri"].as_str().unwrap().starts_with("spotify:playlist:"));
    }
}

// =============================================================================
// Live Gate
// =============================================================================

#[tokio::test]
async fn test_live_gate_skips_explicit_track() {
    let request = post_json(
        "/api/live-gate",
        json!({"track": {"id": "x", "name": "Classical Remix", "explicit": true}}),
    );
    let response = setup_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["admit"], false);
    assert_eq!(body["action"], "skip");
    assert_eq!(body["reason"], "Explicit content");
}

#[tokio::test]
async fn test_live_gate_checks_every_artist() {
    let request = post_json(
        "/api/live-gate",
        json!({
            "name": "Quiet Evening",
            "artists": [{"name": "Calm Trio"}, {"name": "The Club Kids"}]
        }),
    );
    let response = setup_app().oneshot(request).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["action"], "skip");
    assert_eq!(body["reason"], "Blocked keyword: club");
}

#[tokio::test]
async fn test_live_gate_plays_clean_track() {
    let request = post_json(
        "/api/live-gate",
        json!({"track": {"name": "Road Song", "artists": [{"name": "Anyone"}]}}),
    );
    let response = setup_app().oneshot(request).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["admit"], true);
    assert_eq!(body["action"], "play");
    assert_eq!(body["reason"], "Educationally appropriate");
}

#[tokio::test]
async fn test_live_gate_requires_track_object() {
    for body in [json!({"track": "abc"}), json!([1, 2])] {
        let response = setup_app()
            .oneshot(post_json("/api/live-gate", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = extract_json(response.into_body()).await;
        assert_eq!(json["error"], "Track object is required");
    }
}

// =============================================================================
// Routing / Middleware
// =============================================================================

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let response = setup_app().oneshot(get("/api/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Endpoint not found");
}

#[tokio::test]
async fn test_cors_preflight_allows_any_origin() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/content-filter")
        .header(header::ORIGIN, "http://localhost:8080")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = setup_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_compliance_event_stream_opens() {
    let response = setup_app()
        .oneshot(get("/api/compliance/events"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
}

// =============================================================================
// Compliance Logging
// =============================================================================

#[tokio::test]
async fn test_each_classified_track_reaches_bus() {
    let state = AppState::from_config(&TomlConfig::default()).unwrap();
    let mut rx = state.bus.subscribe();
    let app = build_router(state);

    let request = post_json(
        "/api/content-filter",
        json!({
            "tracks": [{"id": "a", "name": "Piano"}, {"id": "b", "name": "Song", "explicit": true}],
            "userInfo": {"id": "student-1"}
        }),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let first = rx.try_recv().expect("First entry");
    let second = rx.try_recv().expect("Second entry");
    assert_eq!(first.subject_id, "a");
    assert_eq!(first.educational_value, 10);
    assert_eq!(second.subject_id, "b");
    assert!(second.is_explicit);
    assert_eq!(second.user_info, Some(json!({"id": "student-1"})));
    assert_ne!(first.entry_id, second.entry_id);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_compliance_entries_appended_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("audit").join("compliance.jsonl");

    let mut config = TomlConfig::default();
    config.compliance.log_file = Some(log_path.clone());
    let app = build_router(AppState::from_config(&config).unwrap());

    let request = post_json(
        "/api/playlists/discover",
        json!({"playlists": [{"id": "p1", "name": "Deep Focus"}, {"id": "p2", "name": "Road Trip"}]}),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let entries: Vec<Value> = read_log_lines(&log_path, 2)
        .await
        .iter()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["subjectKind"], "playlist");
    assert_eq!(entries[0]["subjectId"], "p1");
    assert_eq!(entries[0]["admitted"], true);
    assert_eq!(entries[0]["trackCount"], 0);
    assert_eq!(entries[1]["admitted"], false);
}

#[tokio::test]
async fn test_logging_disabled_by_policy_emits_nothing() {
    let mut config = TomlConfig::default();
    config.policy.log_content_access = false;
    let state = AppState::from_config(&config).unwrap();
    let mut rx = state.bus.subscribe();
    let app = build_router(state);

    let response = app
        .oneshot(post_json("/api/content-filter", json!({"tracks": [{"name": "Piano"}]})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(rx.try_recv().is_err());
}
