use chrono::{Duration, Utc};
use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::config::{self, Session};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to server")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, env = "ROSTER_PASSWORD", help = "Password")]
        password: String,
        #[arg(long, help = "Server URL (defaults to ROSTER_API_URL or the saved session)")]
        server: Option<String>,
    },

    #[command(about = "Forget the saved token")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show current user information from the server")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { username, password, server } => {
            let server_url = config::resolve_server_url(server)?;
            let client = ApiClient::new(&server_url)?;
            let issued = client.login(&username, &password).await?;

            let session = Session {
                server_url,
                username: issued.username.clone(),
                token: issued.token,
                expires_at: Utc::now() + Duration::seconds(issued.expires_in),
            };
            config::save_session(&session)?;

            output_success(
                &output_format,
                &format!("Logged in as {} on {}", session.username, session.server_url),
                Some(json!({ "username": session.username, "expires_at": session.expires_at })),
            )
        }
        AuthCommands::Logout => {
            let message = if config::clear_session()? { "Logged out" } else { "No saved session" };
            output_success(&output_format, message, None)
        }
        AuthCommands::Status => match config::load_session()? {
            Some(session) => {
                let state = if session.is_expired() { "expired" } else { "valid" };
                let reachable = server_reachable(&session.server_url).await;
                output_success(
                    &output_format,
                    &format!(
                        "{} on {} (token {}, expires {}, server {})",
                        session.username,
                        session.server_url,
                        state,
                        session.expires_at.format("%Y-%m-%d %H:%M UTC"),
                        if reachable { "up" } else { "unreachable" }
                    ),
                    Some(json!({
                        "username": session.username,
                        "server": session.server_url,
                        "server_reachable": reachable,
                        "expired": session.is_expired(),
                        "expires_at": session.expires_at,
                    })),
                )
            }
            None => output_success(&output_format, "Not logged in", Some(json!({ "logged_in": false }))),
        },
        AuthCommands::Whoami => {
            let client = super::authenticated_client()?;
            let me = client.whoami().await?;
            let username = me.get("username").and_then(|v| v.as_str()).unwrap_or("unknown").to_string();
            output_success(&output_format, &format!("Authenticated as {}", username), Some(me))
        }
    }
}

/// True when `/health` answers 200
async fn server_reachable(server_url: &str) -> bool {
    let client = match ApiClient::new(server_url) {
        Ok(client) => client,
        Err(_) => return false,
    };
    match client.health().await {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!("Health check against {} failed: {:#}", server_url, e);
            false
        }
    }
}
