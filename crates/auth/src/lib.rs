pub mod callback_server;
pub mod error;
pub mod flow;
pub mod pkce;
pub mod session;
pub mod storage;
pub mod types;

pub use callback_server::CallbackServer;
pub use error::AuthError;
pub use flow::OAuthFlow;
pub use pkce::PkcePair;
pub use session::{Session, SessionState};
pub use storage::TokenStore;
pub use types::{Credentials, OAuthConfig};

use std::time::{SystemTime, UNIX_EPOCH};

/// Current unix time in whole seconds.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
