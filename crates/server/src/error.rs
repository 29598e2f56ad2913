use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use notesapi_engine::EngineError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 400 with `{ "error": ... }`, plus `details` when present.
    #[error("{error}")]
    BadRequest {
        error: String,
        details: Option<String>,
    },

    /// 500 problem document carrying the failure message.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Rewrites a validation failure into the `{ error, details }` shape the
    /// note and todo endpoints use. Other errors pass through.
    pub fn with_details(self, error: &str) -> Self {
        match self {
            Self::BadRequest { error: message, .. } => Self::BadRequest {
                error: error.to_string(),
                details: Some(message),
            },
            other => other,
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        if e.is_client_error() {
            Self::BadRequest {
                error: e.to_string(),
                details: None,
            }
        } else {
            Self::Internal(e.to_string())
        }
    }
}

// Malformed or mistyped bodies are client errors like any other, so they
// share the `{ "error": ... }` shape instead of axum's plain-text rejection.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest {
            error: rejection.body_text(),
            details: None,
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Internal(format!("task join error: {e}"))
    }
}

#[derive(Serialize)]
struct BadRequestBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

#[derive(Serialize)]
struct ProblemBody {
    title: &'static str,
    status: u16,
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest { error, details } => {
                (StatusCode::BAD_REQUEST, Json(BadRequestBody { error, details })).into_response()
            }
            Self::Internal(message) => {
                tracing::error!(error = %message, "request failed");
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                let body = ProblemBody {
                    title: "An error occurred while processing your request.",
                    status: status.as_u16(),
                    detail: format!("Error: {message}"),
                };
                let mut response = (status, Json(body)).into_response();
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    header::HeaderValue::from_static("application/problem+json"),
                );
                response
            }
        }
    }
}
