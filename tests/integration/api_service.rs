//! Request handling: validation, status mapping, and the generic failure body.

use super::test_utils::ScriptedOracle;
use contentcal::api::{CalendarService, GENERIC_FAILURE};
use contentcal::config::CalendarConfig;
use contentcal::pipeline::{CalendarPipeline, ChunkPolicy};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(oracle: &Arc<ScriptedOracle>) -> CalendarService {
    CalendarService::new(CalendarPipeline::new(oracle.clone(), ChunkPolicy::default()).unwrap())
}

fn body(extra: serde_json::Value) -> String {
    let mut base = json!({
        "description": "Neighbourhood bakery with a weekend market stall",
        "platforms": { "instagram": true, "facebook": false, "twitter": false, "linkedin": true },
        "startDate": "2024-01-01",
        "endDate": "2024-01-21"
    });
    if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            base.insert(k.clone(), v.clone());
        }
    }
    base.to_string()
}

#[tokio::test]
async fn test_valid_request_returns_the_calendar() {
    let oracle = Arc::new(ScriptedOracle::size_limited(60));
    let response = service(&oracle).handle(&body(json!({}))).await;

    assert_eq!(response.status, 200);
    // Default cadence: Monday, Wednesday, Friday.
    assert_eq!(response.body["contentIdeas"].as_array().unwrap().len(), 9);
    assert_eq!(response.body["contentIdeas"][0]["date"], "2024-01-01");
    assert_eq!(response.body["contentPillars"][0], "pillar-0");
}

#[tokio::test]
async fn test_frequency_and_explicit_days() {
    let oracle = Arc::new(ScriptedOracle::size_limited(60));
    let svc = service(&oracle);

    let daily = svc.handle(&body(json!({ "frequency": 7 }))).await;
    assert_eq!(daily.body["contentIdeas"].as_array().unwrap().len(), 21);

    let tuesdays = svc
        .handle(&body(json!({ "frequency": 7, "distributionPattern": ["tue"] })))
        .await;
    assert_eq!(tuesdays.body["contentIdeas"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_malformed_requests_are_400_without_oracle_calls() {
    let oracle = Arc::new(ScriptedOracle::size_limited(60));
    let svc = service(&oracle);

    let cases = [
        body(json!({ "description": "" })),
        body(json!({ "platforms": { "instagram": false } })),
        body(json!({ "platforms": ["myspace"] })),
        body(json!({ "startDate": "01/01/2024" })),
        body(json!({ "endDate": "2023-12-01" })),
        body(json!({ "distributionPattern": ["Funday"] })),
        body(json!({ "frequency": 4 })),
        "not json".to_string(),
    ];
    for case in &cases {
        let response = svc.handle(case).await;
        assert_eq!(response.status, 400, "case {} gave {:?}", case, response.body);
        assert!(response.body["error"].is_string());
    }
    assert!(oracle.calls().is_empty());
}

#[tokio::test]
async fn test_exhausted_run_is_a_generic_500() {
    let oracle = Arc::new(ScriptedOracle::size_limited(0));
    let response = service(&oracle).handle(&body(json!({}))).await;

    assert_eq!(response.status, 500);
    assert_eq!(response.body, json!({ "error": GENERIC_FAILURE }));
}

#[tokio::test]
async fn test_service_from_config_talks_to_the_configured_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let workspace = TempDir::new().unwrap();
    let mut config = CalendarConfig::default();
    config.provider.api_key = Some("bad-key".to_string());
    config.provider.endpoint = Some(server.uri());

    let svc = CalendarService::from_config(&config, workspace.path()).unwrap();
    let response = svc.handle(&body(json!({ "endDate": "2024-01-03" }))).await;

    assert_eq!(response.status, 500);
    let audit = std::fs::read_to_string(workspace.path().join("contentcal_audit.log")).unwrap();
    assert!(audit.contains("invalid api key"));
}
