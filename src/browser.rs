use crate::{Result, WarehouseAuthError};

/// Open the authorization URL in the user's default browser
///
/// Convenience for the interactive flow; callers should fall back to
/// printing the URL when this fails (headless sessions, odd desktop
/// environments).
///
/// # Errors
///
/// Returns [`WarehouseAuthError::BrowserLaunch`] if no browser could be
/// launched.
pub fn open_browser(url: &str) -> Result<()> {
    tracing::debug!(url, "opening browser");
    webbrowser::open(url)
        .map_err(|e| WarehouseAuthError::BrowserLaunch(format!("Failed to open browser: {}", e)))
}
