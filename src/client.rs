use crate::types::TokenResponse;
use crate::{OAuthConfig, Result, TokenSet, WarehouseAuthError};

/// Async workspace OAuth client
///
/// Performs the authorization-code grant: it produces the URL the user must
/// visit, then exchanges the code captured on the redirect for a token set.
/// One login cycle only; there is no token refresh.
///
/// # Example
///
/// ```no_run
/// use warehouse_auth::{OAuthClient, OAuthConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = OAuthConfig::for_workspace("ws.example.com", "client-id", "client-secret");
///     let client = OAuthClient::new(config)?;
///
///     println!("Visit: {}", client.authorization_url()?);
///     // The redirect delivers the code...
///
///     let tokens = client.exchange_code("code").await?;
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
    ///
    /// Pure function of the configuration; no network call is made. The URL
    /// carries `response_type=code`, the client ID, the redirect URI and the
    /// fixed `sql offline_access` scope.
    pub fn authorization_url(&self) -> Result<String> {
        crate::types::authorization_url(&self.config)
    }

    /// Exchange an authorization code for a token set
    ///
    /// Issues a single form-encoded POST to the token endpoint. Any
    /// non-success status is fatal and surfaced as
    /// [`WarehouseAuthError::Http`]; nothing is retried.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenSet> {
        let client = reqwest::Client::new();

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
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(WarehouseAuthError::Http { status, body });
        }

        let token_response: TokenResponse = response.json().await?;
        tracing::debug!(token_type = %token_response.token_type.as_deref().unwrap_or("Bearer"),
            "authorization code exchanged");
        Ok(TokenSet::from(token_response))
    }
}
