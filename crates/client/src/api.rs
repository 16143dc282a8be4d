//! Authenticated gateway to the streaming API.
//!
//! Every call validates the session first, attaches the bearer token, logs
//! the status code and raw body, and decodes JSON into the caller's type.
//! Non-2xx bodies are not special-cased: whatever comes back either decodes
//! or surfaces as a decode error. No retries, no backoff.

use std::sync::Arc;

use {
    serde::de::DeserializeOwned,
    tonearm_auth::Session,
    tracing::debug,
};

use crate::error::FetchError;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            http: reqwest::Client::new(),
            session,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        self.request(self.http.get(url).query(query)).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T, FetchError> {
        self.request(self.http.post(url).json(body)).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T, FetchError> {
        self.request(self.http.put(url).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        self.request(self.http.delete(url)).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, FetchError> {
        self.session.ensure_valid().await?;
        let token = self.session.access_token().await?;

        let resp = builder.bearer_auth(token).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        debug!(status, body = %body, "api response");

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use {
        serde_json::Value,
        tonearm_auth::{Credentials, OAuthConfig, OAuthFlow, TokenStore},
    };

    use super::*;
    use crate::models::{Paging, Playlist};

    fn unix_now() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn flow_for(server: &mockito::Server) -> OAuthFlow {
        OAuthFlow::new(OAuthConfig {
            client_id: "client-1".into(),
            client_secret: "secret-1".to_string().into(),
            auth_url: "https://accounts.example.com/authorize".into(),
            token_url: format!("{}/token", server.url()),
            redirect_uri: "http://localhost:3000/callback".into(),
            scopes: vec!["user-read-private".into()],
        })
    }

    fn client_with_token(
        server: &mockito::Server,
        dir: &tempfile::TempDir,
        expires_at: u64,
    ) -> ApiClient {
        let store = TokenStore::new(dir.path().join("tokens.json"));
        store
            .save(&Credentials {
                access_token: "at-1".into(),
                refresh_token: "rt-1".into(),
                expires_at,
            })
            .unwrap();
        ApiClient::new(Arc::new(Session::new(flow_for(server), store)))
    }

    #[tokio::test]
    async fn test_bearer_header_attached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/me")
            .match_header("authorization", "Bearer at-1")
            .with_status(200)
            .with_body(r#"{"id": "user-1"}"#)
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();

        let api = client_with_token(&server, &dir, unix_now() + 300);
        let body: Value = api.get(&format!("{}/v1/me", server.url()), &[]).await.unwrap();
        assert_eq!(body["id"], "user-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_query_parameters_forwarded() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/me/playlists")
            .match_query(mockito::Matcher::UrlEncoded("limit".into(), "10".into()))
            .with_status(200)
            .with_body(r#"{"items": [{"href": "h", "name": "Mix", "public": true}]}"#)
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();

        let api = client_with_token(&server, &dir, unix_now() + 300);
        let page: Paging<Playlist> = api
            .get(
                &format!("{}/v1/me/playlists", server.url()),
                &[("limit", "10")],
            )
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Mix");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_expired_token_refreshed_before_request() {
        let mut server = mockito::Server::new_async().await;
        let refresh = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(r#"{"access_token":"at-2","refresh_token":"rt-2","expires_in":3600}"#)
            .expect(1)
            .create_async()
            .await;
        let api_mock = server
            .mock("GET", "/v1/me")
            .match_header("authorization", "Bearer at-2")
            .with_status(200)
            .with_body(r#"{"id": "user-1"}"#)
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();

        let api = client_with_token(&server, &dir, 0);
        let _: Value = api.get(&format!("{}/v1/me", server.url()), &[]).await.unwrap();
        refresh.assert_async().await;
        api_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_json_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/me")
            .with_status(500)
            .with_body("<html>oops</html>")
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();

        let api = client_with_token(&server, &dir, unix_now() + 300);
        let err = api
            .get::<Value>(&format!("{}/v1/me", server.url()), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn test_no_session_fails_before_network() {
        let server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("tokens.json"));
        let api = ApiClient::new(Arc::new(Session::new(flow_for(&server), store)));

        let err = api
            .get::<Value>(&format!("{}/v1/me", server.url()), &[])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::Auth(tonearm_auth::AuthError::NoSession)
        ));
    }
}
