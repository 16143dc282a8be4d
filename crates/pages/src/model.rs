//! Fully fetched view-models, one per page type. These are what the
//! interactive loop renders; nothing downstream touches raw JSON.

use tonearm_client::models::{Album, Artist, Playlist, Track, UserProfile};

#[derive(Debug, Clone)]
pub enum PageData {
    Home,
    Artists,
    Profile(ProfileData),
    Artist(Box<ArtistDetail>),
}

#[derive(Debug, Clone)]
pub struct ProfileData {
    pub profile: UserProfile,
    pub top_artists: Vec<Artist>,
    pub top_tracks: Vec<Track>,
    /// Public playlists only.
    pub playlists: Vec<Playlist>,
}

#[derive(Debug, Clone)]
pub struct ArtistDetail {
    pub artist: Artist,
    pub top_tracks: Vec<Track>,
    pub albums: Vec<Album>,
    pub singles: Vec<Album>,
    pub appears_on: Vec<Album>,
    pub related: Vec<Artist>,
}
