use thiserror::Error;

/// Failures of the authentication lifecycle. All of these are fatal to the
/// session: there is no retry, the caller must re-drive the login flow.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization code exchange failed with HTTP {status}")]
    Exchange { status: u16 },
    #[error("token refresh failed with HTTP {status}; re-authenticate")]
    Refresh { status: u16 },
    #[error("timed out after {0}s waiting for the authorization redirect")]
    CallbackTimeout(u64),
    #[error("no saved session; log in first")]
    NoSession,
    #[error("token response missing field `{0}`")]
    MissingField(&'static str),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("token store: {0}")]
    Io(#[from] std::io::Error),
    #[error("token store: {0}")]
    Serialize(#[from] serde_json::Error),
}
