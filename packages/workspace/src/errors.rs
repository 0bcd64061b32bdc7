//! Server errors and their HTTP mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use visedit_editor::EditorError;
use visedit_parser::ParseError;
use visedit_preview::PreviewError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{line}:{column}: {message}")]
    Parse {
        message: String,
        position: usize,
        line: usize,
        column: usize,
    },

    #[error("Unknown element {0}")]
    UnknownElement(String),

    #[error("A rendering surface is already attached")]
    SurfaceAttached,

    #[error(transparent)]
    Preview(#[from] PreviewError),

    #[error("Editor error: {0}")]
    Editor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub fn parse(err: &ParseError, source: &str) -> Self {
        let (line, column) = err.line_col(source);
        ServerError::Parse {
            message: err.message(),
            position: err.pos(),
            line,
            column,
        }
    }

    pub fn from_editor(err: EditorError, source: &str) -> Self {
        match err {
            EditorError::Parse(err) => ServerError::parse(&err, source),
            other => ServerError::Editor(other.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Parse { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::UnknownElement(_) => StatusCode::NOT_FOUND,
            ServerError::SurfaceAttached => StatusCode::CONFLICT,
            ServerError::Preview(PreviewError::QueryTimeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            ServerError::Preview(_) => StatusCode::BAD_GATEWAY,
            ServerError::Editor(_) | ServerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ServerError::Parse {
                message,
                position,
                line,
                column,
            } => json!({
                "message": message,
                "position": position,
                "line": line,
                "column": column,
            }),
            other => json!({ "message": other.to_string() }),
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }
        (status, Json(body)).into_response()
    }
}
