//! Authorization-code flow with PKCE: URL construction, code exchange and
//! token refresh. Exchange and refresh are single form-encoded POSTs with no
//! retry; a non-200 response is fatal to the session.

use {
    secrecy::ExposeSecret,
    serde::Deserialize,
    tracing::debug,
    url::Url,
};

use crate::{
    error::AuthError,
    pkce::PkcePair,
    types::{Credentials, OAuthConfig},
    unix_now,
};

/// Leeway subtracted from `expires_in` against clock skew and latency.
const EXPIRY_LEEWAY_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: u64,
}

pub struct OAuthFlow {
    config: OAuthConfig,
    http: reqwest::Client,
}

impl OAuthFlow {
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Build the authorization URL for the system browser. Deterministic for
    /// a given PKCE pair; reads nothing but the config.
    pub fn authorize_url(&self, pkce: &PkcePair) -> Result<Url, AuthError> {
        let mut url = Url::parse(&self.config.auth_url)?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("code_challenge_method", "S256")
            .append_pair("code_challenge", &pkce.challenge)
            .append_pair("scope", &self.config.scopes.join(" "));
        Ok(url)
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange(&self, code: &str, verifier: &str) -> Result<Credentials, AuthError> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code_verifier", verifier),
        ];
        let resp = self
            .http
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AuthError::Exchange {
                status: status.as_u16(),
            });
        }

        let body: TokenResponse = resp.json().await?;
        let refresh_token = body
            .refresh_token
            .ok_or(AuthError::MissingField("refresh_token"))?;
        debug!(expires_in = body.expires_in, "authorization code exchanged");
        Ok(Credentials {
            access_token: body.access_token,
            refresh_token,
            expires_at: unix_now() + body.expires_in - EXPIRY_LEEWAY_SECS,
        })
    }

    /// Refresh an expired access token. The refresh token is replaced only
    /// when the server supplies a new one.
    pub async fn refresh(&self, current: &Credentials) -> Result<Credentials, AuthError> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", current.refresh_token.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose_secret().as_str()),
        ];
        let resp = self
            .http
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AuthError::Refresh {
                status: status.as_u16(),
            });
        }

        let body: TokenResponse = resp.json().await?;
        debug!(expires_in = body.expires_in, "access token refreshed");
        Ok(Credentials {
            access_token: body.access_token,
            refresh_token: body
                .refresh_token
                .unwrap_or_else(|| current.refresh_token.clone()),
            expires_at: unix_now() + body.expires_in - EXPIRY_LEEWAY_SECS,
        })
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }
}
