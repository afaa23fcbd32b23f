use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not logged in")]
    Unauthenticated,

    #[error("Upstream error: {message}")]
    Upstream {
        /// Upstream HTTP status, `None` for transport or decode failures
        status: Option<u16>,
        message: String,
        /// Playlist already created upstream when a later step failed
        playlist_id: Option<String>,
    },

    #[error("Authorization failed: {0}")]
    AuthExchange(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        AppError::Upstream {
            status,
            message: message.into(),
            playlist_id: None,
        }
    }

    /// Attaches the id of a playlist left behind upstream.
    pub fn with_playlist_id(self, id: &str) -> Self {
        match self {
            AppError::Upstream { status, message, .. } => AppError::Upstream {
                status,
                message,
                playlist_id: Some(id.to_string()),
            },
            other => other,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::upstream(
            e.status().map(|s| s.as_u16()),
            format!("Request failed: {}", e),
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut playlist_id = None;
        let (status, error_message) = match self {
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthExchange(ref msg) => {
                tracing::warn!("Token exchange failed: {}", msg);
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            AppError::Upstream {
                status,
                message,
                playlist_id: orphan,
            } => {
                if let Some(ref id) = orphan {
                    tracing::error!("Upstream failure left playlist {} behind: {}", id, message);
                }
                playlist_id = orphan;
                (upstream_status(status), message)
            }
            AppError::Session(ref msg) => {
                tracing::error!("Session error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Session error".to_string())
            }
            AppError::Redis(ref e) => {
                tracing::error!("Redis error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Session store error".to_string())
            }
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = match playlist_id {
            Some(id) => Json(json!({
                "error": error_message,
                "playlist_id": id,
            })),
            None => Json(json!({
                "error": error_message,
            })),
        };

        (status, body).into_response()
    }
}

/// Mirrors upstream error statuses; anything else surfaces as 502.
fn upstream_status(status: Option<u16>) -> StatusCode {
    status
        .and_then(|s| StatusCode::from_u16(s).ok())
        .filter(|s| s.is_client_error() || s.is_server_error())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

pub type Result<T> = std::result::Result<T, AppError>;
