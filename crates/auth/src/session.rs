//! Session lifecycle: owns the credentials, enforces expiry before every
//! gateway call, and funnels refreshes through a single writer.

use std::sync::atomic::{AtomicBool, Ordering};

use {
    tokio::sync::RwLock,
    tracing::{info, warn},
};

use crate::{
    error::AuthError,
    flow::OAuthFlow,
    storage::TokenStore,
    types::Credentials,
    unix_now,
};

/// Lifecycle: `Unauthenticated → AwaitingCode → Authenticated → Expired →
/// Authenticated` via refresh, or back to `Unauthenticated` when the refresh
/// is rejected. The only terminal failure state is `Unauthenticated` with
/// the error surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    AwaitingCode,
    Authenticated,
    Expired,
}

pub struct Session {
    flow: OAuthFlow,
    store: TokenStore,
    credentials: RwLock<Option<Credentials>>,
    awaiting_code: AtomicBool,
}

impl Session {
    /// Create a session, loading any persisted credentials once.
    pub fn new(flow: OAuthFlow, store: TokenStore) -> Self {
        let credentials = store.load();
        Self {
            flow,
            store,
            credentials: RwLock::new(credentials),
            awaiting_code: AtomicBool::new(false),
        }
    }

    pub async fn state(&self) -> SessionState {
        match self.credentials.read().await.as_ref() {
            Some(creds) if unix_now() >= creds.expires_at => SessionState::Expired,
            Some(_) => SessionState::Authenticated,
            None if self.awaiting_code.load(Ordering::SeqCst) => SessionState::AwaitingCode,
            None => SessionState::Unauthenticated,
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.credentials.read().await.is_some()
    }

    /// Authorization URL for the system browser.
    pub fn authorize_url(&self, pkce: &crate::pkce::PkcePair) -> Result<url::Url, AuthError> {
        self.flow.authorize_url(pkce)
    }

    /// Mark that the authorization URL has been handed to the browser and
    /// the flow is waiting on the redirect.
    pub fn begin_login(&self) {
        self.awaiting_code.store(true, Ordering::SeqCst);
    }

    /// Exchange the captured code and persist the resulting credentials.
    pub async fn complete_login(&self, code: &str, verifier: &str) -> Result<(), AuthError> {
        let creds = self.flow.exchange(code, verifier).await?;
        self.store.save(&creds)?;
        *self.credentials.write().await = Some(creds);
        self.awaiting_code.store(false, Ordering::SeqCst);
        info!("session established");
        Ok(())
    }

    /// Make sure the access token is usable, refreshing it first when `now
    /// >= expires_at` (the boundary triggers a refresh). Concurrent callers
    /// race to the write lock; whoever wins refreshes, the rest observe the
    /// fresh token and return.
    pub async fn ensure_valid(&self) -> Result<(), AuthError> {
        {
            let guard = self.credentials.read().await;
            match guard.as_ref() {
                None => return Err(AuthError::NoSession),
                Some(creds) if unix_now() < creds.expires_at => return Ok(()),
                Some(_) => {}
            }
        }

        let mut guard = self.credentials.write().await;
        let current = guard.clone().ok_or(AuthError::NoSession)?;
        if unix_now() < current.expires_at {
            return Ok(());
        }

        match self.flow.refresh(&current).await {
            Ok(fresh) => {
                self.store.save(&fresh)?;
                *guard = Some(fresh);
                info!("access token refreshed");
                Ok(())
            }
            Err(e) => {
                // A rejected refresh ends the session; the next startup
                // must not find tokens the server already invalidated.
                warn!(error = %e, "token refresh rejected, session ended");
                *guard = None;
                let _ = self.store.delete();
                Err(e)
            }
        }
    }

    /// The current access token, for the gateway's bearer header.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        self.credentials
            .read()
            .await
            .as_ref()
            .map(|creds| creds.access_token.clone())
            .ok_or(AuthError::NoSession)
    }

    /// Remaining access-token lifetime in seconds, if a session exists.
    pub async fn expires_in(&self) -> Option<i64> {
        self.credentials
            .read()
            .await
            .as_ref()
            .map(|creds| creds.expires_at as i64 - unix_now() as i64)
    }

    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.delete()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::types::OAuthConfig;

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

    fn session_with(
        server: &mockito::Server,
        dir: &tempfile::TempDir,
        expires_at: u64,
    ) -> Session {
        let store = TokenStore::new(dir.path().join("tokens.json"));
        store
            .save(&Credentials {
                access_token: "at-old".into(),
                refresh_token: "rt-old".into(),
                expires_at,
            })
            .unwrap();
        Session::new(flow_for(server), store)
    }

    fn refresh_body() -> &'static str {
        r#"{"access_token":"at-new","refresh_token":"rt-new","expires_in":3600}"#
    }

    #[tokio::test]
    async fn test_valid_token_is_noop() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .expect(0)
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();

        let session = session_with(&server, &dir, unix_now() + 120);
        session.ensure_valid().await.unwrap();
        assert_eq!(session.state().await, SessionState::Authenticated);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_refresh_fires_exactly_at_expiry_boundary() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(refresh_body())
            .expect(1)
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();

        let session = session_with(&server, &dir, unix_now());
        session.ensure_valid().await.unwrap();

        mock.assert_async().await;
        assert_eq!(session.access_token().await.unwrap(), "at-new");
        // The refreshed credentials were persisted.
        let store = TokenStore::new(dir.path().join("tokens.json"));
        assert_eq!(store.load().unwrap().access_token, "at-new");
    }

    #[tokio::test]
    async fn test_concurrent_callers_trigger_one_refresh() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(refresh_body())
            .expect(1)
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();

        let session = Arc::new(session_with(&server, &dir, 0));
        let a = Arc::clone(&session);
        let b = Arc::clone(&session);
        let (ra, rb) = tokio::join!(
            tokio::spawn(async move { a.ensure_valid().await }),
            tokio::spawn(async move { b.ensure_valid().await }),
        );
        ra.unwrap().unwrap();
        rb.unwrap().unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_refresh_failure_ends_session() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(400)
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();

        let session = session_with(&server, &dir, 0);
        let err = session.ensure_valid().await.unwrap_err();
        assert!(matches!(err, AuthError::Refresh { status: 400 }));
        assert_eq!(session.state().await, SessionState::Unauthenticated);
        // The invalidated tokens are gone from disk.
        assert!(!TokenStore::new(dir.path().join("tokens.json")).is_session_saved());
    }

    #[tokio::test]
    async fn test_no_session_errors_before_any_network() {
        let server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(flow_for(&server), TokenStore::new(dir.path().join("t.json")));

        assert_eq!(session.state().await, SessionState::Unauthenticated);
        assert!(matches!(
            session.ensure_valid().await.unwrap_err(),
            AuthError::NoSession
        ));
        assert!(matches!(
            session.access_token().await.unwrap_err(),
            AuthError::NoSession
        ));
    }

    #[tokio::test]
    async fn test_state_machine_transitions() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(refresh_body())
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();

        let store = TokenStore::new(dir.path().join("tokens.json"));
        let session = Session::new(flow_for(&server), store);
        assert_eq!(session.state().await, SessionState::Unauthenticated);

        session.begin_login();
        assert_eq!(session.state().await, SessionState::AwaitingCode);

        session.complete_login("code", "verifier").await.unwrap();
        assert_eq!(session.state().await, SessionState::Authenticated);
        assert!(TokenStore::new(dir.path().join("tokens.json")).is_session_saved());
    }

    #[tokio::test]
    async fn test_expired_state_reported() {
        let server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();
        let session = session_with(&server, &dir, unix_now().saturating_sub(10));
        assert_eq!(session.state().await, SessionState::Expired);
    }
}
