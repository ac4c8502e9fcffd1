//! Blocking flavors of the OAuth and statements clients
//!
//! Same operations as the async API, no runtime required. Useful for the
//! paste-the-code flow where nothing else in the process is async.

use crate::statements::StatementRequest;
use crate::types::TokenResponse;
use crate::{OAuthConfig, Result, TokenSet, WarehouseAuthError};

/// Blocking workspace OAuth client
///
/// # Example
///
/// ```no_run
/// use warehouse_auth::{OAuthConfig, blocking::OAuthClient};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = OAuthConfig::for_workspace("ws.example.com", "client-id", "client-secret");
///     let client = OAuthClient::new(config)?;
///
///     println!("Visit: {}", client.authorization_url()?);
///     // User authorizes and pastes the code...
///
///     let tokens = client.exchange_code("code")?;
///     println!("Got a {} token", tokens.token_type);
///     Ok(())
/// }
/// ```
pub struct OAuthClient {
    config: OAuthConfig,
}

impl OAuthClient {
    /// Create a new OAuth client with the given configuration
    pub fn new(config: OAuthConfig) -> Result<Self> {
        Ok(Self { config })
    }

    /// Build the authorization URL the user should visit
    pub fn authorization_url(&self) -> Result<String> {
        crate::types::authorization_url(&self.config)
    }

    /// Exchange an authorization code for a token set
    ///
    /// Single form-encoded POST to the token endpoint; any non-success
    /// status is fatal, nothing is retried.
    pub fn exchange_code(&self, code: &str) -> Result<TokenSet> {
        let client = reqwest::blocking::Client::new();

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &self.config.redirect_uri),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
        ];

        let response = client
            .post(&self.config.token_url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .form(&params)
            .send()?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(WarehouseAuthError::Http { status, body });
        }

        let token_response: TokenResponse = response.json()?;
        tracing::debug!("authorization code exchanged");
        Ok(TokenSet::from(token_response))
    }
}

/// Blocking client for the workspace SQL statements endpoint
pub struct StatementsClient {
    statements_url: String,
    access_token: String,
}

impl StatementsClient {
    /// Create a client against an explicit statements endpoint URL
    pub fn new(statements_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            statements_url: statements_url.into(),
            access_token: access_token.into(),
        }
    }

    /// Create a client for a workspace hostname
    pub fn for_workspace(host: impl AsRef<str>, access_token: impl Into<String>) -> Self {
        Self::new(
            format!("https://{}/api/2.0/sql/statements", host.as_ref()),
            access_token,
        )
    }

    /// Submit one statement and return the raw response body
    pub fn submit(&self, request: &StatementRequest) -> Result<serde_json::Value> {
        let client = reqwest::blocking::Client::new();

        let response = client
            .post(&self.statements_url)
            .bearer_auth(&self.access_token)
            .json(request)
            .send()?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(WarehouseAuthError::Http { status, body });
        }

        tracing::debug!(warehouse_id = %request.warehouse_id, "statement submitted");
        response.json().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use mockito::Server;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn blocking_exchange_extracts_the_access_token() {
        let mut server = Server::new();

        let mock = server
            .mock("POST", "/oidc/v1/token")
            .with_status(200)
            .with_body(r#"{"access_token": "tok1", "token_type": "Bearer"}"#)
            .create();

        let config = OAuthConfig::builder()
            .client_id("client-123")
            .client_secret("secret-456")
            .auth_url(format!("{}/oidc/v1/authorize", server.url()))
            .token_url(format!("{}/oidc/v1/token", server.url()))
            .build()
            .unwrap();

        let client = OAuthClient::new(config).unwrap();
        let tokens = client.exchange_code("ABC123").unwrap();
        assert_eq!(tokens.access_token, "tok1");

        mock.assert();
    }

    #[test]
    fn blocking_submit_passes_the_body_through() {
        let mut server = Server::new();

        server
            .mock("POST", "/api/2.0/sql/statements")
            .match_header("authorization", "Bearer tok1")
            .with_status(200)
            .with_body(r#"{"result": "ok"}"#)
            .create();

        let client = StatementsClient::new(
            format!("{}/api/2.0/sql/statements", server.url()),
            "tok1",
        );
        let result = client
            .submit(&StatementRequest::new("SELECT 1", "wh-1"))
            .unwrap();
        assert_eq!(result, serde_json::json!({"result": "ok"}));
    }
}
