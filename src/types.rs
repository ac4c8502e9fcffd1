use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use url::Url;

use crate::{Result, WarehouseAuthError};

/// Redirect URI used when the environment does not provide one
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:5098/callback";

/// Scopes requested on every authorization: SQL execution plus a refresh token
pub(crate) const AUTHORIZATION_SCOPE: &str = "sql offline_access";

/// OAuth token set returned by the workspace token endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    /// The access token used as the bearer credential on API requests
    pub access_token: String,
    /// Token type reported by the provider (normally "Bearer")
    pub token_type: String,
    /// The refresh token, present when the `offline_access` scope was granted.
    /// Carried through for callers; no refresh flow is performed here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Scopes the provider actually granted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Unix timestamp (seconds) when the access token expires
    pub expires_at: u64,
}

impl TokenSet {
    /// Check if the token is expired or will expire within the next 5 minutes
    pub fn is_expired(&self) -> bool {
        self.expires_in() <= Duration::from_secs(300)
    }

    /// Duration until the token expires, `Duration::ZERO` if already expired
    pub fn expires_in(&self) -> Duration {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        if self.expires_at > now {
            Duration::from_secs(self.expires_at - now)
        } else {
            Duration::ZERO
        }
    }
}

/// Configuration for the workspace OAuth client
///
/// The authorization and token endpoints follow the workspace OIDC layout
/// (`https://{host}/oidc/v1/authorize` and `.../token`); use
/// [`OAuthConfig::for_workspace`] to derive them from a hostname, or the
/// builder to point at arbitrary endpoints.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// OAuth client ID registered with the workspace
    pub client_id: String,
    /// OAuth client secret (this is a confidential-client flow)
    pub client_secret: String,
    /// Authorization endpoint URL
    pub auth_url: String,
    /// Token exchange endpoint URL
    pub token_url: String,
    /// Redirect URI the provider sends the browser back to
    pub redirect_uri: String,
}

impl OAuthConfig {
    /// Derive endpoints from a workspace hostname
    pub fn for_workspace(
        host: impl AsRef<str>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        let host = host.as_ref();
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_url: format!("https://{}/oidc/v1/authorize", host),
            token_url: format!("https://{}/oidc/v1/token", host),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
        }
    }

    /// Load configuration from the environment
    ///
    /// Reads `WORKSPACE_URL`, `WORKSPACE_CLIENT_ID` and
    /// `WORKSPACE_CLIENT_SECRET`, plus an optional `WORKSPACE_REDIRECT_URI`
    /// (falling back to [`DEFAULT_REDIRECT_URI`]).
    pub fn from_env() -> Result<Self> {
        let host = required_env("WORKSPACE_URL")?;
        let client_id = required_env("WORKSPACE_CLIENT_ID")?;
        let client_secret = required_env("WORKSPACE_CLIENT_SECRET")?;

        let mut config = Self::for_workspace(host, client_id, client_secret);
        if let Ok(redirect_uri) = std::env::var("WORKSPACE_REDIRECT_URI") {
            config.redirect_uri = redirect_uri;
        }
        Ok(config)
    }

    /// Create a new config builder
    pub fn builder() -> OAuthConfigBuilder {
        OAuthConfigBuilder::default()
    }

    /// Port the local callback listener should bind, taken from the redirect URI
    pub fn redirect_port(&self) -> Result<u16> {
        let url = Url::parse(&self.redirect_uri)?;
        url.port_or_known_default().ok_or_else(|| {
            WarehouseAuthError::InvalidConfig(format!(
                "redirect URI {} carries no usable port",
                self.redirect_uri
            ))
        })
    }
}

fn required_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| WarehouseAuthError::MissingEnv(name.to_string()))
}

/// Builder for OAuthConfig
#[derive(Debug, Clone, Default)]
pub struct OAuthConfigBuilder {
    client_id: Option<String>,
    client_secret: Option<String>,
    auth_url: Option<String>,
    token_url: Option<String>,
    redirect_uri: Option<String>,
}

impl OAuthConfigBuilder {
    /// Set the OAuth client ID
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set the OAuth client secret
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Set the authorization endpoint URL
    pub fn auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = Some(auth_url.into());
        self
    }

    /// Set the token exchange endpoint URL
    pub fn token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = Some(token_url.into());
        self
    }

    /// Set the redirect URI
    pub fn redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Set the redirect URI to the default callback path on a custom port
    pub fn redirect_port(mut self, port: u16) -> Self {
        self.redirect_uri = Some(format!("http://127.0.0.1:{}/callback", port));
        self
    }

    /// Build the OAuthConfig
    ///
    /// # Errors
    ///
    /// Returns an error if the client credentials or either endpoint are
    /// missing; only the redirect URI has a default.
    pub fn build(self) -> Result<OAuthConfig> {
        let missing = |field: &str| WarehouseAuthError::InvalidConfig(format!("{} is required", field));
        Ok(OAuthConfig {
            client_id: self.client_id.ok_or_else(|| missing("client_id"))?,
            client_secret: self.client_secret.ok_or_else(|| missing("client_secret"))?,
            auth_url: self.auth_url.ok_or_else(|| missing("auth_url"))?,
            token_url: self.token_url.ok_or_else(|| missing("token_url"))?,
            redirect_uri: self
                .redirect_uri
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
        })
    }
}

/// Token response from the workspace token endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub expires_in: Option<u64>,
}

impl From<TokenResponse> for TokenSet {
    fn from(response: TokenResponse) -> Self {
        let expires_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            + response.expires_in.unwrap_or(3600);

        TokenSet {
            access_token: response.access_token,
            token_type: response.token_type.unwrap_or_else(|| "Bearer".to_string()),
            refresh_token: response.refresh_token,
            scope: response.scope,
            expires_at,
        }
    }
}

/// Build the authorization URL for the given configuration
///
/// Pure function of the configuration: `response_type=code`, the client ID,
/// the redirect URI and the fixed scope pair, form-encoded. No `state` and no
/// PKCE challenge are sent (see the crate-level notes).
pub(crate) fn authorization_url(config: &OAuthConfig) -> Result<String> {
    let mut url = Url::parse(&config.auth_url)?;
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", &config.client_id)
        .append_pair("redirect_uri", &config.redirect_uri)
        .append_pair("scope", AUTHORIZATION_SCOPE);

    Ok(url.to_string())
}
