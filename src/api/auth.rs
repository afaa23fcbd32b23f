use crate::api::middleware::Session;
use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::models::SessionStatus;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    error: Option<String>,
}

pub fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/session", get(session_status))
        .route("/logout", post(logout))
}

async fn login(State(state): State<Arc<AppState>>) -> Response {
    let url = state.auth_service.build_authorization_url();
    (StatusCode::FOUND, [(header::LOCATION, url)]).into_response()
}

async fn callback(
    State(state): State<Arc<AppState>>,
    Session(previous): Session,
    Query(params): Query<CallbackParams>,
) -> Result<Response> {
    if let Some(error) = params.error {
        return Err(AppError::Validation(format!("Authorization was not granted: {}", error)));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::Validation("Missing code".to_string()))?;

    // A login always starts a fresh session; a cookie carried into the
    // callback never receives the new credential.
    let session_id = Uuid::new_v4();
    state
        .auth_service
        .exchange_code_for_token(session_id, &code)
        .await?;

    if let Some(previous) = previous {
        state.auth_service.logout(previous).await?;
    }

    let cookie = state.auth_service.session_cookie(session_id)?;

    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, state.frontend_url.clone()),
            (header::SET_COOKIE, cookie),
        ],
    )
        .into_response())
}

async fn session_status(
    State(state): State<Arc<AppState>>,
    Session(session_id): Session,
) -> Result<Response> {
    let authenticated = state.auth_service.is_authenticated(session_id).await?;
    let status = if authenticated {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };

    Ok((status, Json(SessionStatus { authenticated })).into_response())
}

async fn logout(
    State(state): State<Arc<AppState>>,
    Session(session_id): Session,
) -> Result<Response> {
    if let Some(id) = session_id {
        state.auth_service.logout(id).await?;
    }

    Ok((
        [(header::SET_COOKIE, state.auth_service.expired_cookie())],
        Json(json!({ "ok": true })),
    )
        .into_response())
}
