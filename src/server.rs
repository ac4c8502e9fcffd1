use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

use crate::{Result, WarehouseAuthError};

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    error: Option<String>,
}

struct ServerState {
    tx: tokio::sync::Mutex<Option<oneshot::Sender<String>>>,
}

/// Local redirect listener for the OAuth callback
///
/// Serves a single `GET /callback` route and delivers the first
/// authorization code it receives over a one-shot channel. The channel
/// enforces the write-once contract: a repeated callback is still answered
/// with 200 so the browser shows something sensible, but its code is dropped.
///
/// The listener is a scoped resource: it is bound explicitly, its address is
/// observable (bind port 0 to let the OS pick one), and it stops on
/// [`CallbackServer::shutdown`] or drop.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use warehouse_auth::CallbackServer;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut server = CallbackServer::bind(5098).await?;
/// // Point the user at the authorization URL...
/// let code = server.wait_for_code(Duration::from_secs(300)).await?;
/// # Ok(())
/// # }
/// ```
pub struct CallbackServer {
    addr: SocketAddr,
    rx: Option<oneshot::Receiver<String>>,
    task: tokio::task::JoinHandle<()>,
}

impl CallbackServer {
    /// Bind the listener on 127.0.0.1 and start serving callbacks
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseAuthError::CallbackServer`] if the port cannot be
    /// bound.
    pub async fn bind(port: u16) -> Result<Self> {
        let (tx, rx) = oneshot::channel();

        let state = Arc::new(ServerState {
            tx: tokio::sync::Mutex::new(Some(tx)),
        });

        let app = Router::new()
            .route("/callback", get(handle_callback))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .map_err(|e| {
                WarehouseAuthError::CallbackServer(format!(
                    "Failed to bind to 127.0.0.1:{}: {}",
                    port, e
                ))
            })?;
        let addr = listener
            .local_addr()
            .map_err(|e| WarehouseAuthError::CallbackServer(e.to_string()))?;

        tracing::info!(%addr, "callback listener bound");

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "callback listener failed");
            }
        });

        Ok(Self {
            addr,
            rx: Some(rx),
            task,
        })
    }

    /// Address the listener is actually bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the authorization code, up to the given deadline
    ///
    /// Blocks until the callback delivers a code or the deadline elapses,
    /// whichever comes first.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseAuthError::CallbackTimeout`] when the deadline
    /// elapses, and [`WarehouseAuthError::CallbackServer`] if the listener
    /// stopped before a code arrived or the code was already consumed.
    pub async fn wait_for_code(&mut self, timeout: Duration) -> Result<String> {
        let rx = self.rx.take().ok_or_else(|| {
            WarehouseAuthError::CallbackServer("Authorization code already consumed".to_string())
        })?;

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(code)) => Ok(code),
            Ok(Err(_)) => Err(WarehouseAuthError::CallbackServer(
                "Listener stopped before a code arrived".to_string(),
            )),
            Err(_) => Err(WarehouseAuthError::CallbackTimeout(timeout)),
        }
    }

    /// Stop the listener
    ///
    /// Dropping the server has the same effect; this just makes the teardown
    /// explicit at call sites.
    pub fn shutdown(self) {
        tracing::debug!(addr = %self.addr, "callback listener stopped");
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn handle_callback(
    Query(params): Query<CallbackQuery>,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    if let Some(error) = params.error.as_deref() {
        // OAuth error responses land here too; answered like a missing code
        tracing::warn!(error, "provider reported an authorization error");
    }

    match params.code {
        Some(code) => {
            match state.tx.lock().await.take() {
                Some(tx) => {
                    tracing::info!("authorization code received");
                    let _ = tx.send(code.clone());
                }
                None => tracing::warn!("repeated callback, authorization code dropped"),
            }
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Authorization code received",
                    "code": code,
                })),
            )
        }
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "No authorization code received",
            })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::time::Duration;

    use super::*;
    use crate::WarehouseAuthError;

    async fn get(url: String) -> (StatusCode, Value) {
        let response = reqwest::get(url).await.unwrap();
        let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn callback_delivers_the_code_and_echoes_it() {
        let mut server = CallbackServer::bind(0).await.unwrap();
        let addr = server.local_addr();

        let (status, body) = get(format!("http://{}/callback?code=ABC123", addr)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"message": "Authorization code received", "code": "ABC123"})
        );

        let code = server.wait_for_code(Duration::from_secs(1)).await.unwrap();
        assert_eq!(code, "ABC123");
    }

    #[tokio::test]
    async fn missing_code_is_rejected_and_nothing_is_delivered() {
        let mut server = CallbackServer::bind(0).await.unwrap();
        let addr = server.local_addr();

        let (status, body) = get(format!("http://{}/callback", addr)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No authorization code received"}));

        let err = server
            .wait_for_code(Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, WarehouseAuthError::CallbackTimeout(_)));
    }

    #[tokio::test]
    async fn provider_error_keeps_the_listener_waiting() {
        let mut server = CallbackServer::bind(0).await.unwrap();
        let addr = server.local_addr();

        let (status, _) = get(format!("http://{}/callback?error=access_denied", addr)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // the user retries and the flow still completes
        let (status, _) = get(format!("http://{}/callback?code=retry-1", addr)).await;
        assert_eq!(status, StatusCode::OK);

        let code = server.wait_for_code(Duration::from_secs(1)).await.unwrap();
        assert_eq!(code, "retry-1");
    }

    #[tokio::test]
    async fn repeated_callback_is_acknowledged_but_only_the_first_code_counts() {
        let mut server = CallbackServer::bind(0).await.unwrap();
        let addr = server.local_addr();

        let (status, _) = get(format!("http://{}/callback?code=first", addr)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get(format!("http://{}/callback?code=second", addr)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], "second");

        let code = server.wait_for_code(Duration::from_secs(1)).await.unwrap();
        assert_eq!(code, "first");
    }

    #[tokio::test]
    async fn wait_times_out_without_a_callback() {
        let mut server = CallbackServer::bind(0).await.unwrap();

        let timeout = Duration::from_millis(50);
        let err = server.wait_for_code(timeout).await.unwrap_err();
        assert!(matches!(
            err,
            WarehouseAuthError::CallbackTimeout(t) if t == timeout
        ));

        server.shutdown();
    }
}
