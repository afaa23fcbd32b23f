pub mod auth;
pub mod genre;
pub mod playlists;
pub mod session;
pub mod spotify;

pub use auth::AuthService;
pub use genre::GenrePolicy;
pub use playlists::PlaylistService;
pub use session::{CredentialStore, MemoryCredentialStore, RedisCredentialStore};
pub use spotify::SpotifyClient;
