use crate::error::Result;
use crate::models::Track;
use crate::services::spotify::{SpotifyClient, MAX_ARTISTS_PER_REQUEST};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// How `filter_tracks` treats its genre argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GenrePolicy {
    /// Every fetched track is kept; the genre argument is ignored.
    #[default]
    PassThrough,
    /// Tracks are kept when one of their artists lists a matching genre.
    /// Costs one extra `GET /artists` per 50 distinct artists.
    ArtistGenres,
}

impl FromStr for GenrePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "passthrough" | "pass-through" | "none" => Ok(GenrePolicy::PassThrough),
            "artist" | "artist_genres" => Ok(GenrePolicy::ArtistGenres),
            other => Err(format!(
                "Unknown GENRE_POLICY '{}', expected 'passthrough' or 'artist'",
                other
            )),
        }
    }
}

impl fmt::Display for GenrePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenrePolicy::PassThrough => write!(f, "passthrough"),
            GenrePolicy::ArtistGenres => write!(f, "artist"),
        }
    }
}

impl GenrePolicy {
    pub async fn apply(
        &self,
        client: &SpotifyClient,
        token: &str,
        tracks: Vec<Track>,
        genre: &str,
    ) -> Result<Vec<Track>> {
        match self {
            GenrePolicy::PassThrough => Ok(tracks),
            GenrePolicy::ArtistGenres => {
                let needle = normalize(genre);
                if needle.is_empty() {
                    return Ok(tracks);
                }

                let genres = resolve_artist_genres(client, token, &tracks).await?;
                let kept: Vec<Track> = tracks
                    .into_iter()
                    .filter(|t| track_matches(t, &genres, &needle))
                    .collect();

                tracing::debug!("Artist genre filter '{}' kept {} tracks", needle, kept.len());
                Ok(kept)
            }
        }
    }
}

/// Fetches genres for every distinct artist across `tracks`, in batches.
async fn resolve_artist_genres(
    client: &SpotifyClient,
    token: &str,
    tracks: &[Track],
) -> Result<HashMap<String, Vec<String>>> {
    let mut seen = HashSet::new();
    let ids: Vec<&str> = tracks
        .iter()
        .flat_map(|t| t.artist_ids())
        .filter(|id| seen.insert(*id))
        .collect();

    let mut genres = HashMap::with_capacity(ids.len());
    for batch in ids.chunks(MAX_ARTISTS_PER_REQUEST) {
        let response = client.artists(token, batch).await?;
        for artist in response.artists.into_iter().flatten() {
            genres.insert(artist.id, artist.genres);
        }
    }

    Ok(genres)
}

fn track_matches(track: &Track, genres: &HashMap<String, Vec<String>>, needle: &str) -> bool {
    track
        .artist_ids()
        .filter_map(|id| genres.get(id))
        .flatten()
        .any(|g| normalize(g).contains(needle))
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}
