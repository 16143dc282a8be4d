//! One-shot local listener that captures the authorization code from the
//! OAuth redirect.

use std::{collections::HashMap, time::Duration};

use {
    axum::{
        Router,
        extract::{Query, State},
        http::StatusCode,
        response::{Html, IntoResponse, Response},
        routing::get,
    },
    tokio::sync::{mpsc, oneshot},
    tracing::{debug, info},
};

use crate::error::AuthError;

pub struct CallbackServer;

impl CallbackServer {
    /// Bind `127.0.0.1:port` and wait for a single GET carrying a `code`
    /// query parameter. Requests without one are answered with 400 and the
    /// wait continues, so stray probes (favicon requests and the like) do
    /// not abort the login. Fails with [`AuthError::CallbackTimeout`] once
    /// `timeout` elapses.
    pub async fn wait_for_code(port: u16, timeout: Duration) -> Result<String, AuthError> {
        let (code_tx, mut code_rx) = mpsc::channel::<String>(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let app = Router::new().fallback(get(capture)).with_state(code_tx);
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        info!(port, "waiting for authorization redirect");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        let outcome = tokio::time::timeout(timeout, code_rx.recv()).await;

        // Graceful shutdown lets the in-flight 200 response reach the
        // browser before the listener goes away.
        let _ = shutdown_tx.send(());
        let _ = server.await;

        match outcome {
            Ok(Some(code)) => Ok(code),
            _ => Err(AuthError::CallbackTimeout(timeout.as_secs())),
        }
    }
}

async fn capture(
    State(code_tx): State<mpsc::Sender<String>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    match params.get("code") {
        Some(code) => {
            debug!("authorization code received");
            let _ = code_tx.send(code.clone()).await;
            Html("Authorization successful, you can close this window.").into_response()
        }
        None => {
            debug!("redirect without code parameter");
            (StatusCode::BAD_REQUEST, "Missing 'code' query parameter.").into_response()
        }
    }
}
