use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A playlist track as returned upstream, kept as the raw JSON object so it
/// serializes back exactly, explicit nulls included. Only the uri and the
/// artist ids are read locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Track(Map<String, Value>);

impl Track {
    pub fn uri(&self) -> Option<&str> {
        self.0.get("uri").and_then(Value::as_str)
    }

    pub fn artist_ids(&self) -> impl Iterator<Item = &str> {
        self.0
            .get("artists")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|artist| artist.get("id").and_then(Value::as_str))
    }
}

#[derive(Debug, Deserialize)]
pub struct PlaylistTrackItem {
    /// Null for removed or local-only items
    #[serde(default)]
    pub track: Option<Track>,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistTracksPage {
    #[serde(default)]
    pub items: Vec<PlaylistTrackItem>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artist {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ArtistsResponse {
    /// Unknown ids come back as null entries
    #[serde(default)]
    pub artists: Vec<Option<Artist>>,
}

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    pub playlists: Vec<String>,
    #[serde(default)]
    pub genre: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedPlaylist {
    pub playlist_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterResult {
    pub filtered_tracks: Vec<Track>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_playlists: Vec<FailedPlaylist>,
}
