use crate::api::AppState;
use crate::error::{AppError, Result};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use std::sync::Arc;
use uuid::Uuid;

/// The caller's session id, if the request carries a validly signed session cookie.
/// Never rejects: operations decide for themselves whether a session is required.
pub struct Session(pub Option<Uuid>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self> {
        let session_id = cookie_value(&parts.headers, state.auth_service.cookie_name())
            .and_then(|token| state.auth_service.verify_session(token));

        Ok(Session(session_id))
    }
}

/// Finds a cookie by name across all `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}
