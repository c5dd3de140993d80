//! CLI command implementations.

pub mod address;
pub mod cart;
pub mod wishlist;

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;

use giftshop_client::{ApiError, ClientConfig, ConfigError, Notice, NoticeKind, Session, StoreEvent};
use giftshop_core::{AddressError, IdError, ProductId};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("{0}")]
    Notice(#[from] Notice),

    #[error("invalid product id: {0}")]
    InvalidId(#[from] IdError),

    #[error("address data unavailable: {0}")]
    AddressData(String),

    #[error("invalid address: {0}")]
    Address(#[from] AddressError),

    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not signed in")]
    NotSignedIn,
}

/// Output options shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// Print `value` as pretty JSON.
    pub fn print_json<T: Serialize>(self, value: &T) -> Result<(), CliError> {
        let encoded = serde_json::to_string_pretty(value)?;
        #[allow(clippy::print_stdout)]
        {
            println!("{encoded}");
        }
        Ok(())
    }

    /// Print one line per item.
    pub fn print_lines<I, S>(self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: std::fmt::Display,
    {
        #[allow(clippy::print_stdout)]
        {
            for item in items {
                println!("{item}");
            }
        }
    }
}

/// Start a session from environment configuration.
pub fn start_session() -> Result<Session, CliError> {
    let config = ClientConfig::from_env()?;
    tracing::debug!(?config, "Starting session");
    Ok(Session::start(config)?)
}

/// Parse a product id argument.
pub fn product_id(raw: &str) -> Result<ProductId, CliError> {
    Ok(ProductId::parse(raw)?)
}

/// Longest time to wait for the login redirect after a 401.
const REDIRECT_WAIT: Duration = Duration::from_secs(10);

/// Report a failed mutation. On session expiry, wait for the scheduled
/// redirect so the user sees where to sign in again.
pub async fn report_failure(notice: Notice, mut events: broadcast::Receiver<StoreEvent>) -> CliError {
    tracing::warn!(kind = ?notice.kind, mutation = %notice.mutation, "{}", notice.message);

    if notice.kind == NoticeKind::Unauthorized {
        let redirect = tokio::time::timeout(REDIRECT_WAIT, async {
            loop {
                match events.recv().await {
                    Ok(StoreEvent::RedirectToLogin { path }) => return Some(path),
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .await;

        if let Ok(Some(path)) = redirect {
            tracing::info!(path = %path, "Sign in again to continue");
        }
    }

    CliError::Notice(notice)
}

/// Show the signed-in user.
pub async fn whoami(session: &Session, output: Output) -> Result<(), CliError> {
    let user = session.current_user().await?.ok_or(CliError::NotSignedIn)?;

    if output.json {
        return output.print_json(&user);
    }

    let role = user.role.as_deref().unwrap_or("customer");
    output.print_lines([
        format!("{} <{}>", user.name, user.email),
        format!("id:   {}", user.id),
        format!("role: {role}"),
    ]);
    Ok(())
}
