//! Typed results for the endpoints the pages consume. Unknown response
//! fields are ignored; arrays the API serves as `null` default to empty.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Followers {
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    #[serde(default)]
    pub followers: Followers,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub followers: Followers,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistRef {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub album_type: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    pub album: Option<Album>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistOwner {
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Playlist {
    pub href: String,
    pub name: String,
    pub public: Option<bool>,
    #[serde(default)]
    pub owner: PlaylistOwner,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// Standard paged list wrapper; only the current page's items matter here.
#[derive(Debug, Clone, Deserialize)]
pub struct Paging<T> {
    #[serde(default)]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopTracksResponse {
    #[serde(default)]
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelatedArtistsResponse {
    #[serde(default)]
    pub artists: Vec<Artist>,
}

impl UserProfile {
    /// URL of the largest profile image, if any.
    pub fn largest_image(&self) -> Option<&Image> {
        largest(&self.images)
    }
}

impl Artist {
    pub fn largest_image(&self) -> Option<&Image> {
        largest(&self.images)
    }
}

fn largest(images: &[Image]) -> Option<&Image> {
    images.iter().max_by_key(|img| {
        img.width.unwrap_or(0) as u64 * img.height.unwrap_or(0) as u64
    })
}
