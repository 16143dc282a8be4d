//! The loadable-page seam: every page type knows how to fetch its own data
//! through the gateway and is addressed by a string identifier that may
//! encode a subtype (`Artist:<id>`).

use {
    async_trait::async_trait,
    tonearm_client::{ApiClient, FetchError, models::Artist},
    tonearm_config::Endpoints,
};

use crate::{
    artist::ArtistPage,
    model::PageData,
    profile::ProfilePage,
};

/// Everything a fetch needs: the authenticated gateway plus the endpoint
/// templates from configuration.
#[derive(Clone)]
pub struct PageContext {
    pub api: ApiClient,
    pub endpoints: Endpoints,
}

#[async_trait]
pub trait Page: Send + Sync {
    fn id(&self) -> String;

    /// Retrieve everything the page renders. Runs off the interactive task;
    /// may issue any number of gateway calls.
    async fn fetch(&self, ctx: &PageContext) -> Result<PageData, FetchError>;
}

/// A navigable page identity plus the seed payload needed to (re-)fetch it.
/// This is what the history stacks own.
#[derive(Debug, Clone)]
pub enum PageRequest {
    Home,
    Artists,
    Profile,
    Artist(Artist),
}

impl PageRequest {
    pub fn id(&self) -> String {
        match self {
            Self::Home => "Home".into(),
            Self::Artists => "Artists".into(),
            Self::Profile => "Profile".into(),
            Self::Artist(artist) => format!("Artist:{}", artist.id),
        }
    }

    pub fn build(&self) -> Box<dyn Page> {
        match self {
            Self::Home => Box::new(HomePage),
            Self::Artists => Box::new(ArtistsPage),
            Self::Profile => Box::new(ProfilePage),
            Self::Artist(artist) => Box::new(ArtistPage::new(artist.clone())),
        }
    }
}

/// Landing page; nothing to fetch.
pub struct HomePage;

#[async_trait]
impl Page for HomePage {
    fn id(&self) -> String {
        "Home".into()
    }

    async fn fetch(&self, _ctx: &PageContext) -> Result<PageData, FetchError> {
        Ok(PageData::Home)
    }
}

/// Artist overview placeholder; nothing to fetch.
pub struct ArtistsPage;

#[async_trait]
impl Page for ArtistsPage {
    fn id(&self) -> String {
        "Artists".into()
    }

    async fn fetch(&self, _ctx: &PageContext) -> Result<PageData, FetchError> {
        Ok(PageData::Artists)
    }
}
