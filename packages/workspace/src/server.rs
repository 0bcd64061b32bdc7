//! HTTP API for the designer

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use visedit_editor::{ElementUpdate, StyleMap};

use crate::bridge::surface_socket;
use crate::state::{AppState, DocumentSnapshot};
use crate::ServerError;

/// `GET /api/elements/:uid` payload
#[derive(Debug, Serialize)]
pub struct ElementResponse {
    pub uid: String,
    pub text: String,
    /// Resolved style as reported by the rendering surface
    pub style: StyleMap,
}

#[derive(Debug, Serialize)]
struct ScheduledResponse {
    uid: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/document", get(get_document).put(put_document))
        .route("/api/elements/:uid", post(post_element).get(get_element))
        .route("/ws", get(surface_socket))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind `addr` and serve until the listener fails
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Designer server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn get_document(State(state): State<Arc<AppState>>) -> Json<DocumentSnapshot> {
    Json(state.snapshot())
}

async fn put_document(
    State(state): State<Arc<AppState>>,
    source: String,
) -> Result<Json<DocumentSnapshot>, ServerError> {
    tracing::info!("Replacing document source ({} bytes)", source.len());
    Ok(Json(state.replace_source(source)?))
}

async fn post_element(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
    Json(update): Json<ElementUpdate>,
) -> impl IntoResponse {
    state.schedule_update(uid.clone(), update);
    (StatusCode::ACCEPTED, Json(ScheduledResponse { uid }))
}

async fn get_element(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Result<Json<ElementResponse>, ServerError> {
    let preview = state
        .node_preview(&uid)
        .ok_or_else(|| ServerError::UnknownElement(uid.clone()))?;

    let style = state.host().query_style(&uid).await?;

    Ok(Json(ElementResponse {
        uid,
        text: preview.text,
        style,
    }))
}
