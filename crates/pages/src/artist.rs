//! Single-artist page: discography sections, top tracks and related
//! artists, seeded by the artist object the card navigation handed over.

use {
    async_trait::async_trait,
    tonearm_client::{
        FetchError,
        models::{Album, Artist, Paging, RelatedArtistsResponse, TopTracksResponse},
    },
};

use crate::{
    model::{ArtistDetail, PageData},
    page::{Page, PageContext},
};

const DISCOGRAPHY_LIMIT: &str = "9";

pub struct ArtistPage {
    artist: Artist,
}

impl ArtistPage {
    pub fn new(artist: Artist) -> Self {
        Self { artist }
    }

    async fn albums_group(&self, ctx: &PageContext, group: &str) -> Result<Vec<Album>, FetchError> {
        let url = ctx.endpoints.artist.albums_url(&self.artist.id);
        let page: Paging<Album> = ctx
            .api
            .get(
                &url,
                &[("include_groups", group), ("limit", DISCOGRAPHY_LIMIT)],
            )
            .await?;
        Ok(page.items)
    }
}

#[async_trait]
impl Page for ArtistPage {
    fn id(&self) -> String {
        format!("Artist:{}", self.artist.id)
    }

    async fn fetch(&self, ctx: &PageContext) -> Result<PageData, FetchError> {
        let albums = self.albums_group(ctx, "album").await?;
        let singles = self.albums_group(ctx, "single").await?;
        let appears_on = self.albums_group(ctx, "appears_on").await?;

        let top_tracks: TopTracksResponse = ctx
            .api
            .get(&ctx.endpoints.artist.top_tracks_url(&self.artist.id), &[])
            .await?;

        let related: RelatedArtistsResponse = ctx
            .api
            .get(
                &ctx.endpoints.artist.related_artists_url(&self.artist.id),
                &[],
            )
            .await?;

        Ok(PageData::Artist(Box::new(ArtistDetail {
            artist: self.artist.clone(),
            top_tracks: top_tracks.tracks,
            albums,
            singles,
            appears_on,
            related: related.artists,
        })))
    }
}
