pub mod auth;
pub mod employee;

use anyhow::Context;

use crate::cli::client::AuthenticatedClient;
use crate::cli::config;

/// Client for the saved session; fails when nobody is logged in or the token has expired
pub fn authenticated_client() -> anyhow::Result<AuthenticatedClient> {
    let session = config::load_session()?
        .context("Not logged in. Run `roster auth login <username>` first")?;
    if session.is_expired() {
        anyhow::bail!("Saved token expired at {}. Run `roster auth login` again", session.expires_at);
    }
    let server_url = std::env::var("ROSTER_API_URL").unwrap_or(session.server_url);
    AuthenticatedClient::new(server_url.trim_end_matches('/'), session.token)
}
