//! API Integration Tests
//!
//! Author: hephaex@gmail.com

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::get,
    Router,
};
use cosmo_api::{create_router, create_router_for_testing, state::AppState};
use cosmo_chat::assistant::{AGENT_NOT_CONFIGURED_REPLY, MISSING_URL_REPLY};
use cosmo_chat::matcher::NO_KNOWLEDGE_REPLY;
use cosmo_core::{AgentError, AgentRequest, AppConfig, SearchAgent};
use serde_json::{json, Value};
use tower::ServiceExt;

const SAMPLE_HTML: &str = "<html><body><script>var x = 1;</script>\
    <p>ISRO of India studies the Bay of Bengal.</p>\
    <p>INSAT monitors the Arabian Sea.</p></body></html>";

/// Helper to create a test request
fn create_json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request and decode the JSON body (Null for empty bodies)
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

async fn new_session(app: &Router) -> String {
    let (status, json) = send(app, create_json_request("POST", "/api/v1/sessions", None)).await;
    assert_eq!(status, StatusCode::CREATED);
    json["session_id"].as_str().unwrap().to_string()
}

async fn chat(app: &Router, session: &str, body: Value) -> (StatusCode, Value) {
    send(
        app,
        create_json_request("POST", &format!("/api/v1/sessions/{session}/chat"), Some(body)),
    )
    .await
}

/// Local page server standing in for a remote site
async fn spawn_upstream() -> String {
    let app = Router::new()
        .route("/page", get(|| async { SAMPLE_HTML }))
        .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "gone") }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = create_router_for_testing();

    let (status, json) = send(&app, create_json_request("GET", "/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_readiness_check() {
    let app = create_router_for_testing();

    let (status, json) = send(&app, create_json_request("GET", "/ready", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ready"], true);
    assert_eq!(json["checks"]["agent_configured"], false);
    assert_eq!(json["checks"]["llm_configured"], false);
}

#[tokio::test]
async fn test_metrics_count_sessions() {
    let app = create_router_for_testing();
    new_session(&app).await;

    let (status, json) = send(&app, create_json_request("GET", "/metrics", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["active_sessions"], 1);
    assert!(json["total_requests"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn test_openapi_document() {
    let app = create_router_for_testing();

    let (status, json) = send(&app, create_json_request("GET", "/api-docs/openapi.json", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/api/v1/sessions/{id}/chat"].is_object());
    assert!(json["paths"]["/api/v1/graph/render"].is_object());
    assert!(json["components"]["schemas"]["ExplorationResponse"].is_object());
}

// =============================================================================
// Session Tests
// =============================================================================

#[tokio::test]
async fn test_session_lifecycle() {
    let app = create_router_for_testing();
    let id = new_session(&app).await;
    let uri = format!("/api/v1/sessions/{id}");

    let (status, _) = send(&app, create_json_request("DELETE", &uri, None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, json) = send(&app, create_json_request("DELETE", &uri, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let app = create_router_for_testing();
    let uri = format!("/api/v1/sessions/{}/chat", uuid::Uuid::new_v4());

    let (status, _) = send(&app, create_json_request("GET", &uri, None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_limit_drops_oldest() {
    let mut config = AppConfig::default();
    config.server.max_sessions = 1;
    let app = create_router(Arc::new(AppState::new(config).unwrap()));

    let first = new_session(&app).await;
    let second = new_session(&app).await;

    let (status, _) = send(
        &app,
        create_json_request("GET", &format!("/api/v1/sessions/{first}/chat"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        create_json_request("GET", &format!("/api/v1/sessions/{second}/chat"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Exploration Tests
// =============================================================================

#[tokio::test]
async fn test_explore_upload() {
    let app = create_router_for_testing();
    let id = new_session(&app).await;

    let (status, json) = send(
        &app,
        create_json_request(
            "POST",
            &format!("/api/v1/sessions/{id}/explore/upload"),
            Some(json!({ "filename": "mosdac.html", "content": SAMPLE_HTML })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["source"], "mosdac.html");
    assert!(json["preview"].as_str().unwrap().starts_with("ISRO of India"));
    assert!(json["pair_count"].as_u64().unwrap() >= 3);
    assert!(json["triples"]
        .as_array()
        .unwrap()
        .contains(&json!({ "subject": "INSAT", "predicate": "monitor", "object": "Sea" })));
    assert!(json["graph_svg"].as_str().unwrap().contains("<svg"));
}

#[tokio::test]
async fn test_explore_upload_rejects_unsupported_format() {
    let app = create_router_for_testing();
    let id = new_session(&app).await;

    let (status, json) = send(
        &app,
        create_json_request(
            "POST",
            &format!("/api/v1/sessions/{id}/explore/upload"),
            Some(json!({ "filename": "report.pdf", "content": "binary" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_explore_url() {
    let upstream = spawn_upstream().await;
    let app = create_router_for_testing();
    let id = new_session(&app).await;

    let (status, json) = send(
        &app,
        create_json_request(
            "POST",
            &format!("/api/v1/sessions/{id}/explore/url"),
            Some(json!({ "url": format!("{upstream}/page") })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["triple_count"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn test_fetch_failure_leaves_knowledge_untouched() {
    let upstream = spawn_upstream().await;
    let app = create_router_for_testing();
    let id = new_session(&app).await;

    let (status, json) = send(
        &app,
        create_json_request(
            "POST",
            &format!("/api/v1/sessions/{id}/explore/url"),
            Some(json!({ "url": format!("{upstream}/missing") })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "FETCH_FAILED");
    assert_eq!(
        json["message"],
        "Probe failed to establish connection with target coordinates"
    );

    let (status, json) = chat(
        &app,
        &id,
        json!({ "mode": "knowledge_base", "message": "What does INSAT monitor?" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reply"]["content"], NO_KNOWLEDGE_REPLY);
}

// =============================================================================
// Chat Tests
// =============================================================================

#[tokio::test]
async fn test_knowledge_base_chat_after_upload() {
    let app = create_router_for_testing();
    let id = new_session(&app).await;

    send(
        &app,
        create_json_request(
            "POST",
            &format!("/api/v1/sessions/{id}/explore/upload"),
            Some(json!({ "filename": "notes.txt", "content": "INSAT monitors the Arabian Sea." })),
        ),
    )
    .await;

    let (status, json) = chat(&app, &id, json!({ "message": "What does INSAT monitor?" })).await;

    assert_eq!(status, StatusCode::OK);
    let reply = json["reply"]["content"].as_str().unwrap();
    assert!(reply.starts_with("Found "));
    assert!(reply.contains("INSAT — monitor → Sea"));
    assert_eq!(json["reply"]["kind"], "plain");
    assert_eq!(json["history"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_chat_rejects_empty_message() {
    let app = create_router_for_testing();
    let id = new_session(&app).await;

    let (status, _) = chat(&app, &id, json!({ "mode": "knowledge_base", "message": "   " })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_web_search_without_agent() {
    let app = create_router_for_testing();
    let id = new_session(&app).await;

    let (status, json) = chat(&app, &id, json!({ "mode": "web_search", "message": "INSAT-3D" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reply"]["content"], AGENT_NOT_CONFIGURED_REPLY);
    assert_eq!(json["reply"]["kind"], "url_derived");
}

#[tokio::test]
async fn test_url_analysis_requires_url() {
    let app = create_router_for_testing();
    let id = new_session(&app).await;

    let (status, json) = chat(
        &app,
        &id,
        json!({ "mode": "url_analysis", "message": "What products exist?" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reply"]["content"], MISSING_URL_REPLY);
}

#[tokio::test]
async fn test_history_and_clear() {
    let app = create_router_for_testing();
    let id = new_session(&app).await;
    let uri = format!("/api/v1/sessions/{id}/chat");

    chat(&app, &id, json!({ "message": "hello" })).await;

    let (status, json) = send(&app, create_json_request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    let messages = json["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "assistant");

    let (status, _) = send(&app, create_json_request("DELETE", &uri, None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, json) = send(&app, create_json_request("GET", &uri, None)).await;
    assert!(json["messages"].as_array().unwrap().is_empty());
}

/// Records every call and answers with a fixed string
struct StubAgent {
    calls: Mutex<Vec<AgentRequest>>,
}

#[async_trait]
impl SearchAgent for StubAgent {
    async fn search(&self, request: &AgentRequest) -> Result<String, AgentError> {
        self.calls.lock().unwrap().push(request.clone());
        Ok("INSAT-3D carries a six channel imager.".to_string())
    }

    fn name(&self) -> &str {
        "stub"
    }
}

#[tokio::test]
async fn test_url_analysis_delegates_to_agent() {
    let agent = Arc::new(StubAgent {
        calls: Mutex::new(Vec::new()),
    });
    let state = AppState::new(AppConfig::default())
        .unwrap()
        .with_agent(agent.clone());
    let app = create_router(Arc::new(state));
    let id = new_session(&app).await;

    let (status, json) = chat(
        &app,
        &id,
        json!({
            "mode": "url_analysis",
            "message": "Which imager does it carry?",
            "url": "https://www.mosdac.gov.in/insat-3d"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["reply"]["content"],
        "INSAT-3D carries a six channel imager."
    );
    assert_eq!(json["reply"]["kind"], "url_derived");

    let calls = agent.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].url.as_deref(),
        Some("https://www.mosdac.gov.in/insat-3d")
    );
    assert_eq!(calls[0].query, "Which imager does it carry?");
    assert!(calls[0].instruction.contains("Which imager does it carry?"));
}

// =============================================================================
// Graph Rendering Tests
// =============================================================================

#[tokio::test]
async fn test_render_graph_svg() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(create_json_request(
            "POST",
            "/api/v1/graph/render",
            Some(json!({
                "pairs": [{ "source": "ISRO", "target": "India" }],
                "triples": [{ "subject": "INSAT", "predicate": "monitor", "object": "Sea" }]
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/svg+xml"
    );
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let svg = String::from_utf8(body.to_vec()).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("Knowledge Graph - Entity Relationships"));
}

#[tokio::test]
async fn test_render_empty_graph_is_unprocessable() {
    let app = create_router_for_testing();

    let (status, json) = send(
        &app,
        create_json_request("POST", "/api/v1/graph/render", Some(json!({}))),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "UNPROCESSABLE");
}

#[tokio::test]
async fn test_render_oversized_graph_is_unprocessable() {
    let mut config = AppConfig::default();
    config.render.max_nodes = 10;
    let app = create_router(Arc::new(AppState::new(config).unwrap()));

    let pairs: Vec<Value> = (0..20)
        .map(|i| json!({ "source": "MOSDAC", "target": format!("product {i}") }))
        .collect();
    let (status, json) = send(
        &app,
        create_json_request("POST", "/api/v1/graph/render", Some(json!({ "pairs": pairs }))),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "UNPROCESSABLE");
    assert!(json["message"].as_str().unwrap().contains("21 nodes"));
}
