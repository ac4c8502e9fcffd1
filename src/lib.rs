//! # warehouse-auth
//!
//! OAuth 2.0 authorization-code flow for SQL warehouse workspaces, plus a
//! thin client for submitting a statement with the resulting access token.
//!
//! The crate covers one login cycle: build the authorization URL, capture
//! the code on a local redirect listener, exchange it for a token set, and
//! authenticate a statements-endpoint request with the bearer token. It is
//! not a token cache or a multi-tenant auth service.
//!
//! ## Features
//!
//! - **Async API** (default): async OAuth and statements clients
//! - **Blocking API** (optional): no async runtime required
//! - **Callback Server** (default): local listener that captures the
//!   redirect automatically (requires tokio)
//! - **Browser Integration** (default): auto-open the authorization URL
//! - **Configurable**: workspace-derived or fully custom endpoints,
//!   environment sourcing
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use warehouse_auth::{CallbackServer, OAuthClient, OAuthConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = OAuthConfig::for_workspace("ws.example.com", "client-id", "client-secret");
//!     let port = config.redirect_port()?;
//!     let client = OAuthClient::new(config)?;
//!
//!     let mut server = CallbackServer::bind(port).await?;
//!     println!("Visit: {}", client.authorization_url()?);
//!
//!     let code = server.wait_for_code(Duration::from_secs(300)).await?;
//!     let tokens = client.exchange_code(&code).await?;
//!     println!("Got a {} token", tokens.token_type);
//!     Ok(())
//! }
//! ```
//!
//! ## Protocol notes
//!
//! The authorization request carries exactly `response_type=code`, the
//! client ID, the redirect URI and the `sql offline_access` scope. Known
//! gaps, reproduced deliberately rather than papered over:
//!
//! - no CSRF `state` parameter and no PKCE challenge on the front channel
//! - no token refresh; the refresh token is surfaced on [`TokenSet`] but
//!   never used here
//! - statement execution is assumed to complete synchronously; a
//!   pending/async execution status in the response is passed through
//!   untouched, not polled for

mod error;
mod statements;
mod types;

#[cfg(feature = "async")]
mod client;

#[cfg(feature = "blocking")]
pub mod blocking;

#[cfg(feature = "browser")]
mod browser;

#[cfg(feature = "callback-server")]
mod server;

// Public API exports
pub use error::{Result, WarehouseAuthError};
pub use statements::{StatementParameter, StatementRequest};
pub use types::{DEFAULT_REDIRECT_URI, OAuthConfig, OAuthConfigBuilder, TokenSet};

#[cfg(feature = "async")]
pub use client::OAuthClient;
#[cfg(feature = "async")]
pub use statements::StatementsClient;

#[cfg(feature = "browser")]
pub use browser::open_browser;

#[cfg(feature = "callback-server")]
pub use server::CallbackServer;
