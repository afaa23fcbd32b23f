use crate::api::middleware::Session;
use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::models::{CreatePlaylistRequest, CreatePlaylistResponse, FilterRequest, FilterResult, PlaylistPage};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use validator::Validate;

pub fn playlist_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/get_playlists", get(get_playlists))
        .route("/filter_songs", post(filter_songs))
        .route("/create_playlist", post(create_playlist))
}

async fn get_playlists(
    State(state): State<Arc<AppState>>,
    Session(session_id): Session,
) -> Result<Json<PlaylistPage>> {
    let page = state.playlist_service.list_playlists(session_id).await?;
    Ok(Json(page))
}

async fn filter_songs(
    State(state): State<Arc<AppState>>,
    Session(session_id): Session,
    Json(req): Json<FilterRequest>,
) -> Result<Json<FilterResult>> {
    let result = state
        .playlist_service
        .filter_tracks(session_id, &req.playlists, &req.genre)
        .await?;
    Ok(Json(result))
}

async fn create_playlist(
    State(state): State<Arc<AppState>>,
    Session(session_id): Session,
    Json(req): Json<CreatePlaylistRequest>,
) -> Result<Json<CreatePlaylistResponse>> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let response = state
        .playlist_service
        .create_playlist(session_id, &req.track_uris)
        .await?;
    Ok(Json(response))
}
