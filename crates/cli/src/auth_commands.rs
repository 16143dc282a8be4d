use std::time::Duration;

use {
    anyhow::Result,
    clap::Subcommand,
    tonearm_auth::{CallbackServer, OAuthConfig, OAuthFlow, PkcePair, Session, TokenStore},
    tonearm_config::Config,
};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Log in through the browser-based authorization flow.
    Login,
    /// Show whether a session is saved and how long it stays valid.
    Status,
    /// Forget the saved session.
    Logout,
}

pub async fn handle_auth(action: AuthAction, config: &Config) -> Result<()> {
    match action {
        AuthAction::Login => {
            login(config).await?;
            Ok(())
        }
        AuthAction::Status => status(config),
        AuthAction::Logout => logout(config),
    }
}

fn oauth_config_for(config: &Config) -> OAuthConfig {
    let api = &config.api;
    OAuthConfig {
        client_id: api.client_id.clone(),
        client_secret: api.client_secret.clone(),
        auth_url: api.auth_url.clone(),
        token_url: api.access_token_url.clone(),
        redirect_uri: api.redirect_uri.clone(),
        scopes: api.scopes.clone(),
    }
}

pub fn build_session(config: &Config) -> Session {
    Session::new(
        OAuthFlow::new(oauth_config_for(config)),
        TokenStore::new(&config.api.token_file),
    )
}

/// Drive the whole authorization flow: browser hand-off, redirect capture,
/// code exchange, persistence. Returns the established session.
pub async fn login(config: &Config) -> Result<Session> {
    let session = build_session(config);
    let pkce = PkcePair::generate(config.api.verifier_length);
    let url = session.authorize_url(&pkce)?;

    session.begin_login();
    println!("Opening browser for authorization...");
    if open::that(url.as_str()).is_err() {
        println!("Could not open browser. Please visit:\n{url}");
    }

    let port = config.callback_port()?;
    println!("Waiting for the redirect on {} ...", config.api.redirect_uri);
    let code = CallbackServer::wait_for_code(
        port,
        Duration::from_secs(config.api.callback_timeout_secs),
    )
    .await?;

    println!("Exchanging code for tokens...");
    session.complete_login(&code, &pkce.verifier).await?;

    println!("Logged in.");
    Ok(session)
}

fn status(config: &Config) -> Result<()> {
    let store = TokenStore::new(&config.api.token_file);
    match store.load() {
        None => println!("No saved session."),
        Some(tokens) => {
            let now = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs();
            if tokens.expires_at > now {
                let remaining = tokens.expires_at - now;
                let hours = remaining / 3600;
                let mins = (remaining % 3600) / 60;
                println!("Session valid ({hours}h {mins}m remaining)");
            } else {
                println!("Session expired; it refreshes on next use.");
            }
        }
    }
    Ok(())
}

fn logout(config: &Config) -> Result<()> {
    let store = TokenStore::new(&config.api.token_file);
    store.delete()?;
    println!("Logged out.");
    Ok(())
}
