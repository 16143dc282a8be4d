use {thiserror::Error, tonearm_auth::AuthError};

/// Anything that can go wrong while retrieving page data. Scoped to the
/// page being loaded; never retried.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("undecodable response body: {0}")]
    Decode(#[from] serde_json::Error),
}
