//! Integration tests for `BrandsightClient` using wiremock HTTP mocks.

use brandsight_cli::{build_document, AnalyzeResult, BrandsightClient, ClientError};
use brandsight_core::SourceType;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> BrandsightClient {
    BrandsightClient::new(base_url, Some("test-token".to_string()), 30)
        .expect("client construction should not fail")
}

fn report_json(id: Uuid, title: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "owner_id": "owner-1",
        "title": title,
        "description": "Listen to songs and podcasts.",
        "icon": "https://cdn.example.com/spotify.png",
        "keywords": ["music"],
        "sentiment_distribution": { "negative": 20.0, "neutral": 30.0, "positive": 50.0 },
        "analyzed_reviews": [
            { "user": "ana", "rating": 5, "review": "love it", "sentiment": "POSITIVE",
              "confidence": 0.93, "keywords": ["love"] }
        ],
        "suggestions": ["Fewer ads."],
        "success": true,
        "created_at": "2025-06-01T12:00:00Z",
        "updated_at": "2025-06-01T12:00:00Z"
    })
}

fn meta() -> serde_json::Value {
    serde_json::json!({ "request_id": "req-1", "timestamp": "2025-06-01T12:00:00Z" })
}

#[tokio::test]
async fn analyze_parses_completed_report() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    let mut data = report_json(id, "Spotify");
    data["status"] = "completed".into();

    Mock::given(method("POST"))
        .and(path("/api/v1/analyze"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(serde_json::json!({
            "ownerId": "owner-1",
            "brandURL": "https://play.google.com/store/apps/details?id=com.spotify.music",
            "reviewCount": 5
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": data, "meta": meta() })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = test_client(&server.uri())
        .analyze(
            "owner-1",
            "https://play.google.com/store/apps/details?id=com.spotify.music",
            5,
        )
        .await
        .expect("analyze");

    let AnalyzeResult::Completed(report) = result else {
        panic!("expected completed, got {result:?}");
    };
    assert_eq!(report.id, id);
    assert_eq!(report.content.title, "Spotify");
    assert_eq!(report.content.analyzed_reviews.len(), 1);

    let doc = build_document(&report);
    assert!(doc.pages[0].lines.iter().any(|l| l.contains("love it")));
}

#[tokio::test]
async fn analyze_parses_not_implemented() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "status": "not_implemented",
                "message": "Map place analysis is not available yet.",
                "source_type": "map_place"
            },
            "meta": meta()
        })))
        .mount(&server)
        .await;

    let result = test_client(&server.uri())
        .analyze("owner-1", "https://www.google.com/maps/place/x/@1,2,3z/data=", 10)
        .await
        .expect("analyze");

    assert!(matches!(
        result,
        AnalyzeResult::NotImplemented { source_type: SourceType::MapPlace, .. }
    ));
}

#[tokio::test]
async fn error_envelope_becomes_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analyze"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": { "code": "upstream_unavailable", "message": "an upstream service failed during analyze" },
            "meta": meta()
        })))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .analyze("owner-1", "https://play.google.com/store/apps/details?id=a.b", 10)
        .await
        .unwrap_err();

    assert!(
        matches!(err, ClientError::Api { status: 500, ref code, .. } if code == "upstream_unavailable"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn history_returns_reports_in_server_order() {
    let server = MockServer::start().await;
    let newer = Uuid::new_v4();
    let older = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path("/api/v1/history"))
        .and(body_partial_json(serde_json::json!({ "ownerId": "owner-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "count": 2,
            "data": [report_json(newer, "newer"), report_json(older, "older")],
            "meta": meta()
        })))
        .mount(&server)
        .await;

    let reports = test_client(&server.uri())
        .history("owner-1")
        .await
        .expect("history");
    let ids: Vec<Uuid> = reports.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![newer, older]);
}

#[tokio::test]
async fn empty_history_is_an_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/history"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": { "code": "empty_result", "message": "no reports found for this owner" },
            "meta": meta()
        })))
        .mount(&server)
        .await;

    let reports = test_client(&server.uri())
        .history("owner-1")
        .await
        .expect("history");
    assert!(reports.is_empty());
}

#[tokio::test]
async fn report_not_found_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": { "code": "not_found", "message": "report not found" },
            "meta": meta()
        })))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .report(Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 404, .. }));
}

#[tokio::test]
async fn register_owner_reports_creation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/owners"))
        .and(body_partial_json(serde_json::json!({ "ownerId": "device-42", "name": "Ana" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "data": { "owner_id": "device-42", "created": true },
            "meta": meta()
        })))
        .mount(&server)
        .await;

    let created = test_client(&server.uri())
        .register_owner("device-42", Some("Ana"))
        .await
        .expect("register");
    assert!(created);
}

#[test]
fn invalid_server_url_is_rejected() {
    let result = BrandsightClient::new("not a url", None, 30);
    assert!(matches!(result, Err(ClientError::InvalidBaseUrl { .. })));
}

#[tokio::test]
async fn owner_returns_display_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/owners/device-42"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "owner_id": "device-42",
                "display_name": "Ana Lima",
                "created_at": "2025-06-01T12:00:00Z"
            },
            "meta": meta()
        })))
        .expect(1)
        .mount(&server)
        .await;

    let owner = test_client(&server.uri())
        .owner("device-42")
        .await
        .expect("owner");
    assert_eq!(owner.owner_id, "device-42");
    assert_eq!(owner.first_name(), Some("Ana"));
}

#[tokio::test]
async fn unknown_owner_is_not_found_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/owners/stranger"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": { "code": "not_found", "message": "owner not found" },
            "meta": meta()
        })))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .owner("stranger")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Api { status: 404, ref code, .. } if code == "not_found"
    ));
}
