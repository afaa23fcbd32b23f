//! Shared test fixtures: a recording stand-in for the Spotify accounts service
//! and Web API, plus helpers to wire the app against it.
#![allow(dead_code)]

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use playlist_filter::config::Config;
use playlist_filter::services::{CredentialStore, MemoryCredentialStore};
use playlist_filter::AppState;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const SESSION_SECRET: &str = "0123456789abcdef0123456789abcdef";
pub const FRONTEND_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

impl RecordedCall {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

/// Canned upstream responses. Playlists missing from `playlist_tracks` answer 404.
#[derive(Debug, Clone)]
pub struct StubBehavior {
    pub token: (u16, Value),
    pub playlists: Value,
    pub playlist_tracks: HashMap<String, Value>,
    pub me: (u16, Value),
    pub create_playlist: (u16, Value),
    pub add_tracks_status: u16,
    pub artist_genres: HashMap<String, Vec<String>>,
}

impl Default for StubBehavior {
    fn default() -> Self {
        Self {
            token: (200, json!({"access_token": "T", "token_type": "Bearer"})),
            playlists: json!({
                "href": "https://api.spotify.com/v1/me/playlists?offset=0&limit=20",
                "limit": 20,
                "next": "https://api.spotify.com/v1/me/playlists?offset=20&limit=20",
                "offset": 0,
                "previous": null,
                "total": 21,
                "items": [{
                    "id": "p1",
                    "name": "Road Trip",
                    "description": "",
                    "public": true,
                    "collaborative": false,
                    "href": "https://api.spotify.com/v1/playlists/p1",
                    "uri": "spotify:playlist:p1",
                    "images": [],
                    "owner": {"id": "user-1", "display_name": "User"},
                    "tracks": {"href": "https://api.spotify.com/v1/playlists/p1/tracks", "total": 2},
                    "snapshot_id": "xyz"
                }]
            }),
            playlist_tracks: HashMap::new(),
            me: (200, json!({"id": "user-1", "display_name": "User"})),
            create_playlist: (201, json!({"id": "new-playlist-42", "name": "Filtered Playlist"})),
            add_tracks_status: 201,
            artist_genres: HashMap::new(),
        }
    }
}

impl StubBehavior {
    /// Registers a playlist whose tracks are `(uri, artist_id)` pairs.
    pub fn with_playlist(mut self, id: &str, tracks: &[(&str, &str)]) -> Self {
        let items: Vec<Value> = tracks
            .iter()
            .map(|(uri, artist)| {
                json!({
                    "added_at": "2024-01-01T00:00:00Z",
                    "track": {
                        "uri": uri,
                        "id": uri.rsplit(':').next().unwrap_or(uri),
                        "name": format!("Song {}", uri),
                        "artists": [{"id": artist, "name": format!("Artist {}", artist)}],
                        "duration_ms": 180000
                    }
                })
            })
            .collect();

        self.playlist_tracks.insert(
            id.to_string(),
            json!({"items": items, "next": null, "total": tracks.len()}),
        );
        self
    }

    pub fn with_artist(mut self, id: &str, genres: &[&str]) -> Self {
        self.artist_genres
            .insert(id.to_string(), genres.iter().map(|g| g.to_string()).collect());
        self
    }
}

#[derive(Clone)]
struct StubState {
    behavior: Arc<StubBehavior>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

pub struct StubSpotify {
    pub base_url: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl StubSpotify {
    pub async fn start(behavior: StubBehavior) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            behavior: Arc::new(behavior),
            calls: calls.clone(),
        };

        let app = Router::new().fallback(handle).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            calls,
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.path == path)
            .collect()
    }
}

async fn handle(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    state.calls.lock().unwrap().push(RecordedCall {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    let behavior = &state.behavior;
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    match (method, segments.as_slice()) {
        (Method::POST, ["accounts", "api", "token"]) => reply(behavior.token.0, behavior.token.1.clone()),
        (Method::GET, ["v1", "me", "playlists"]) => reply(200, behavior.playlists.clone()),
        (Method::GET, ["v1", "me"]) => reply(behavior.me.0, behavior.me.1.clone()),
        (Method::GET, ["v1", "playlists", id, "tracks"]) => match behavior.playlist_tracks.get(*id) {
            Some(page) => reply(200, page.clone()),
            None => not_found(),
        },
        (Method::POST, ["v1", "users", _, "playlists"]) => {
            reply(behavior.create_playlist.0, behavior.create_playlist.1.clone())
        }
        (Method::POST, ["v1", "playlists", _, "tracks"]) => {
            if behavior.add_tracks_status < 300 {
                reply(behavior.add_tracks_status, json!({"snapshot_id": "snap"}))
            } else {
                reply(
                    behavior.add_tracks_status,
                    json!({"error": {"status": behavior.add_tracks_status, "message": "Add failed"}}),
                )
            }
        }
        (Method::GET, ["v1", "artists"]) => {
            let ids = uri
                .query()
                .and_then(|q| q.strip_prefix("ids="))
                .unwrap_or_default()
                .replace("%2C", ",");
            let artists: Vec<Value> = ids
                .split(',')
                .filter(|id| !id.is_empty())
                .map(|id| match behavior.artist_genres.get(id) {
                    Some(genres) => json!({"id": id, "name": id, "genres": genres}),
                    None => Value::Null,
                })
                .collect();
            reply(200, json!({ "artists": artists }))
        }
        _ => not_found(),
    }
}

fn reply(status: u16, body: Value) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body)).into_response()
}

fn not_found() -> Response {
    reply(404, json!({"error": {"status": 404, "message": "Resource not found"}}))
}

pub fn test_config(stub: &StubSpotify, extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = [
        ("SPOTIFY_CLIENT_ID", "client-123"),
        ("SPOTIFY_CLIENT_SECRET", "client-secret"),
        ("SESSION_SECRET", SESSION_SECRET),
        ("FRONTEND_URL", FRONTEND_URL),
        ("UPSTREAM_TIMEOUT_SECS", "5"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    vars.insert("SPOTIFY_ACCOUNTS_URL".to_string(), format!("{}/accounts", stub.base_url));
    vars.insert("SPOTIFY_API_URL".to_string(), format!("{}/v1", stub.base_url));
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }

    Config::from_lookup(|key| vars.get(key).cloned()).expect("test config should be valid")
}

pub struct TestApp {
    pub stub: StubSpotify,
    pub store: MemoryCredentialStore,
    pub state: Arc<AppState>,
    pub config: Config,
}

impl TestApp {
    pub async fn start(behavior: StubBehavior) -> Self {
        Self::start_with(behavior, &[]).await
    }

    pub async fn start_with(behavior: StubBehavior, extra: &[(&str, &str)]) -> Self {
        let stub = StubSpotify::start(behavior).await;
        let config = test_config(&stub, extra);
        let store = MemoryCredentialStore::new();
        let shared: Arc<dyn CredentialStore> = Arc::new(store.clone());
        let state = Arc::new(AppState::new(&config, shared).expect("app state"));

        Self {
            stub,
            store,
            state,
            config,
        }
    }

    pub fn router(&self) -> Router {
        playlist_filter::build_router(self.state.clone(), &self.config.cors_origins)
    }

    /// `Cookie` header value for a signed session.
    pub fn cookie_for(&self, session_id: uuid::Uuid) -> String {
        let token = self.state.auth_service.sign_session(session_id).unwrap();
        format!("{}={}", self.config.session_cookie_name, token)
    }
}

pub fn request(method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
