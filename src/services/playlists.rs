use crate::error::{AppError, Result};
use crate::models::{
    CreatePlaylistResponse, FailedPlaylist, FilterResult, PlaylistPage, SessionCredential, Track,
    DEFAULT_PLAYLIST_NAME,
};
use crate::services::genre::GenrePolicy;
use crate::services::session::CredentialStore;
use crate::services::SpotifyClient;
use futures::future::join_all;
use std::sync::Arc;
use uuid::Uuid;

/// Playlist reads, track filtering and playlist creation on behalf of a session.
pub struct PlaylistService {
    spotify: Arc<SpotifyClient>,
    store: Arc<dyn CredentialStore>,
    genre_policy: GenrePolicy,
}

impl PlaylistService {
    pub fn new(
        spotify: Arc<SpotifyClient>,
        store: Arc<dyn CredentialStore>,
        genre_policy: GenrePolicy,
    ) -> Self {
        Self {
            spotify,
            store,
            genre_policy,
        }
    }

    /// Resolves the stored credential; fails before any upstream call when absent.
    async fn credential(&self, session_id: Option<Uuid>) -> Result<SessionCredential> {
        let session_id = session_id.ok_or(AppError::Unauthenticated)?;
        self.store
            .get(session_id)
            .await?
            .ok_or(AppError::Unauthenticated)
    }

    pub async fn list_playlists(&self, session_id: Option<Uuid>) -> Result<PlaylistPage> {
        let credential = self.credential(session_id).await?;
        self.spotify
            .current_user_playlists(&credential.access_token)
            .await
    }

    /// Collects tracks from every listed playlist, then applies the genre policy.
    /// A playlist that fails to load is reported in `failed_playlists` and the
    /// rest are still returned.
    pub async fn filter_tracks(
        &self,
        session_id: Option<Uuid>,
        playlist_ids: &[String],
        genre: &str,
    ) -> Result<FilterResult> {
        let credential = self.credential(session_id).await?;
        let token = credential.access_token.as_str();

        // join_all yields results in input order
        let pages = join_all(
            playlist_ids
                .iter()
                .map(|id| self.spotify.playlist_tracks(token, id)),
        )
        .await;

        let mut tracks: Vec<Track> = Vec::new();
        let mut failed_playlists = Vec::new();
        for (playlist_id, page) in playlist_ids.iter().zip(pages) {
            match page {
                Ok(page) => tracks.extend(page.items.into_iter().filter_map(|item| item.track)),
                Err(e) => {
                    tracing::warn!("Skipping playlist {}: {}", playlist_id, e);
                    failed_playlists.push(FailedPlaylist {
                        playlist_id: playlist_id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Collected {} tracks from {} playlists ({} failed, policy {})",
            tracks.len(),
            playlist_ids.len(),
            failed_playlists.len(),
            self.genre_policy
        );

        let filtered_tracks = self
            .genre_policy
            .apply(&self.spotify, token, tracks, genre)
            .await?;

        Ok(FilterResult {
            filtered_tracks,
            failed_playlists,
        })
    }

    /// Creates a public "Filtered Playlist" for the current user and adds
    /// `track_uris` to it in one batch. A created playlist is not removed when
    /// adding tracks fails; its id is carried on the error instead.
    pub async fn create_playlist(
        &self,
        session_id: Option<Uuid>,
        track_uris: &[String],
    ) -> Result<CreatePlaylistResponse> {
        let credential = self.credential(session_id).await?;
        let token = credential.access_token.as_str();

        let profile = self.spotify.current_user(token).await?;
        let created = self
            .spotify
            .create_playlist(token, &profile.id, DEFAULT_PLAYLIST_NAME, true)
            .await?;

        tracing::info!(
            "Created playlist {} for user {}, adding {} tracks",
            created.id,
            profile.id,
            track_uris.len()
        );

        self.spotify
            .add_tracks(token, &created.id, track_uris)
            .await
            .map_err(|e| e.with_playlist_id(&created.id))?;

        Ok(CreatePlaylistResponse {
            playlist_url: self.spotify.playlist_url(&created.id),
            playlist_id: created.id,
        })
    }
}
