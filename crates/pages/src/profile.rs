//! Current-user profile page: profile details, this month's top artists and
//! tracks, and the user's public playlists.

use {
    async_trait::async_trait,
    tonearm_client::{
        FetchError,
        models::{Artist, Paging, Playlist, Track, UserProfile},
    },
};

use crate::{
    model::{PageData, ProfileData},
    page::{Page, PageContext},
};

const TOP_ARTISTS_LIMIT: &str = "8";
const TOP_TRACKS_LIMIT: &str = "10";
const PLAYLISTS_LIMIT: &str = "10";

pub struct ProfilePage;

#[async_trait]
impl Page for ProfilePage {
    fn id(&self) -> String {
        "Profile".into()
    }

    async fn fetch(&self, ctx: &PageContext) -> Result<PageData, FetchError> {
        let users = &ctx.endpoints.users;

        let profile: UserProfile = ctx.api.get(&users.current_user_profile, &[]).await?;

        let top_artists: Paging<Artist> = ctx
            .api
            .get(
                &users.user_top_item_artists,
                &[("time_range", "short_term"), ("limit", TOP_ARTISTS_LIMIT)],
            )
            .await?;

        let top_tracks: Paging<Track> = ctx
            .api
            .get(
                &users.user_top_item_tracks,
                &[("time_range", "short_term"), ("limit", TOP_TRACKS_LIMIT)],
            )
            .await?;

        let playlists: Paging<Playlist> = ctx
            .api
            .get(&users.current_user_playlists, &[("limit", PLAYLISTS_LIMIT)])
            .await?;

        Ok(PageData::Profile(ProfileData {
            profile,
            top_artists: top_artists.items,
            top_tracks: top_tracks.items,
            playlists: playlists
                .items
                .into_iter()
                .filter(|playlist| playlist.public.unwrap_or(false))
                .collect(),
        }))
    }
}
