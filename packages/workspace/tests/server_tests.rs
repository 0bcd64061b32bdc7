//! In-process tests of the designer HTTP API

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use visedit_editor::Document;
use visedit_workspace::{router, AppState, ServerConfig, SurfaceMode};

fn app(source: &str, config: ServerConfig) -> (Arc<AppState>, Router) {
    let state = AppState::new(Document::initialize(source).unwrap(), &config);
    let app = router(Arc::clone(&state));
    (state, app)
}

async fn call(app: &Router, method: Method, uri: &str, body: Body) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    call(app, Method::GET, uri, Body::empty()).await
}

#[tokio::test]
async fn test_get_document_returns_tagged_source() {
    let (_state, app) = app("<div>hi</div>", ServerConfig::default());

    let (status, body) = get(&app, "/api/document").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "source": "<div data-uid=\"el-0\">hi</div>",
            "version": 0,
            "selected": null,
            "lastError": null,
        })
    );
}

#[tokio::test]
async fn test_put_document_replaces_and_tags() {
    let (_state, app) = app("<div>hi</div>", ServerConfig::default());

    let (status, body) = call(
        &app,
        Method::PUT,
        "/api/document",
        Body::from("<div data-uid=\"el-0\">hi</div>\n<p>new</p>"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], 1);
    assert_eq!(
        body["source"],
        "<div data-uid=\"el-0\">hi</div>\n<p data-uid=\"el-1\">new</p>"
    );
}

#[tokio::test]
async fn test_put_invalid_document_keeps_previous() {
    let (_state, app) = app("<div>hi</div>", ServerConfig::default());

    let (status, body) = call(&app, Method::PUT, "/api/document", Body::from("<div>\n  <p>")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["line"], 2);
    assert!(body["message"].as_str().unwrap().contains("</p>"));

    let (_, document) = get(&app, "/api/document").await;
    assert_eq!(document["source"], "<div data-uid=\"el-0\">hi</div>");
    assert!(document["lastError"].as_str().unwrap().starts_with("2:"));
}

#[tokio::test(start_paused = true)]
async fn test_rapid_updates_are_coalesced() {
    let (_state, app) = app("<div>hi</div>", ServerConfig::default());

    for color in ["red", "green", "blue"] {
        let body = Body::from(json!({ "style": { "color": color } }).to_string());
        let (status, body) = call(&app, Method::POST, "/api/elements/el-0", body).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["uid"], "el-0");
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let (_, pending) = get(&app, "/api/document").await;
    assert_eq!(pending["version"], 0);

    tokio::time::sleep(Duration::from_millis(300)).await;

    let (_, document) = get(&app, "/api/document").await;
    assert_eq!(document["version"], 1);
    assert_eq!(
        document["source"],
        "<div data-uid=\"el-0\" style={{ color: \"blue\" }}>hi</div>"
    );
}

#[tokio::test]
async fn test_get_element_reads_style_from_surface() {
    let (state, app) = app(
        "<h1 style={{ 'font-size': '28px' }}>AcMem</h1>",
        ServerConfig::default(),
    );

    let body = Body::from(json!({ "text": "AcMem beta", "style": { "color": "red" } }).to_string());
    call(&app, Method::POST, "/api/elements/el-0", body).await;
    assert!(state.flush());

    let (status, element) = get(&app, "/api/elements/el-0").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        element,
        json!({
            "uid": "el-0",
            "text": "AcMem beta",
            "style": { "fontSize": "28px", "color": "red" },
        })
    );
}

#[tokio::test]
async fn test_get_unknown_element_is_not_found() {
    let (_state, app) = app("<div>hi</div>", ServerConfig::default());

    let (status, body) = get(&app, "/api/elements/el-9").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Unknown element el-9");
}

#[tokio::test(start_paused = true)]
async fn test_style_query_without_surface_times_out() {
    let config = ServerConfig {
        surface: SurfaceMode::Remote,
        ..ServerConfig::default()
    };
    let (_state, app) = app("<div>hi</div>", config);

    let (status, body) = get(&app, "/api/elements/el-0").await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["message"], "Style query for el-0 timed out after 2000 ms");
}

#[tokio::test]
async fn test_surface_selection_reaches_session() {
    let (state, app) = app("<main><p>a</p><p>b</p></main>", ServerConfig::default());
    let surface = state.local_surface().unwrap();
    surface
        .subscribe()
        .wait_for(|status| status.renders == 1)
        .await
        .unwrap();

    surface.click("el-2");

    let mut selected = Value::Null;
    for _ in 0..100 {
        let (_, document) = get(&app, "/api/document").await;
        selected = document["selected"].clone();
        if !selected.is_null() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(selected, "el-2");
    assert_eq!(state.host().selected().as_deref(), Some("el-2"));
}
