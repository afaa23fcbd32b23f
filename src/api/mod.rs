pub mod auth;
pub mod health;
pub mod middleware;
pub mod playlists;

pub use auth::auth_routes;
pub use health::health_routes;
pub use playlists::playlist_routes;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    AuthService, CredentialStore, PlaylistService, SpotifyClient,
};
use std::sync::Arc;

pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub playlist_service: Arc<PlaylistService>,
    /// Where the browser lands after a successful login
    pub frontend_url: String,
}

impl AppState {
    /// Wires services around a given credential store.
    pub fn new(config: &Config, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let spotify = Arc::new(SpotifyClient::new(config)?);

        let auth_service = Arc::new(AuthService::new(spotify.clone(), store.clone(), config)?);
        let playlist_service = Arc::new(PlaylistService::new(spotify, store, config.genre_policy));

        Ok(AppState {
            auth_service,
            playlist_service,
            frontend_url: config.frontend_url.clone(),
        })
    }
}
