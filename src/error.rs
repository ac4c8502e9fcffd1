use thiserror::Error;

/// Error types for workspace OAuth and statement submission
#[derive(Error, Debug)]
pub enum WarehouseAuthError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error: {status}: {body}")]
    Http { status: u16, body: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[cfg(feature = "callback-server")]
    #[error("Callback server error: {0}")]
    CallbackServer(String),

    #[cfg(feature = "callback-server")]
    #[error("Timed out after {0:?} waiting for the authorization callback")]
    CallbackTimeout(std::time::Duration),

    #[cfg(feature = "browser")]
    #[error("Failed to open browser: {0}")]
    BrowserLaunch(String),
}

/// Result type alias for warehouse authentication operations
pub type Result<T> = std::result::Result<T, WarehouseAuthError>;
