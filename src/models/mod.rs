pub mod playlist;
pub mod session;
pub mod track;

pub use playlist::{
    AddTracks, CreatePlaylistRequest, CreatePlaylistResponse, CreatedPlaylist, NewPlaylist, PlaylistPage,
    PlaylistSummary, UserProfile, DEFAULT_PLAYLIST_NAME,
};
pub use session::{SessionCredential, SessionStatus};
pub use track::{
    Artist, ArtistsResponse, FailedPlaylist, FilterRequest, FilterResult, PlaylistTracksPage, Track,
};
