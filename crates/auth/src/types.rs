use {
    secrecy::SecretString,
    serde::{Deserialize, Serialize},
};

/// OAuth 2.0 provider configuration.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub auth_url: String,
    pub token_url: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

/// Tokens for an established session.
///
/// `expires_at` is always set alongside `access_token`; it already includes
/// the 60-second leeway subtracted at exchange/refresh time. The on-disk
/// representation uses the `token_expires` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp past which the access token must be refreshed.
    #[serde(rename = "token_expires")]
    pub expires_at: u64,
}
