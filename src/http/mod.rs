//! HTTP webhook server.
//!
//! The messaging gateway calls these routes:
//!
//! | Route                      | Purpose                               |
//! |----------------------------|---------------------------------------|
//! | `POST /incoming-sms`       | inbound admin and target texts        |
//! | `POST /incoming-call`      | call-center main menu (TwiML)         |
//! | `POST /catfacts-call-menu` | menu keypresses (TwiML)               |
//! | `GET /sounds/*`            | audio clips referenced by the menus   |
//!
//! Inbound texts are handed to the coordinator; the handler only waits for
//! the outcome to pick the acknowledgement body.

pub mod twiml;
pub mod voice;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Form, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tracing::{debug, info, warn};

use crate::content::ContentSource;
use crate::coordinator::CoordinatorHandle;
use crate::error::TransportError;
use crate::notifier::Notifier;

/// Body returned to the gateway after an admin command.
pub const SMS_ACK: &str = "Finished processing POST request to /incoming-sms";

/// State shared by every handler.
pub struct AppState {
    /// Front door to the coordinator.
    pub coordinator: CoordinatorHandle,
    /// Used by the voice menu to text a fact to callers.
    pub notifier: Arc<dyn Notifier>,
    /// Facts for the voice menu.
    pub content: ContentSource,
    /// Number outbound texts come from.
    pub sender: String,
    /// Public base URL, without trailing slash.
    pub server_root: String,
    /// Directory containing `sounds/`.
    pub public_dir: PathBuf,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("sender", &self.sender)
            .field("server_root", &self.server_root)
            .field("public_dir", &self.public_dir)
            .finish_non_exhaustive()
    }
}

/// Form fields posted by the gateway for an inbound text.
#[derive(Debug, Deserialize)]
pub struct InboundSms {
    /// Sender's number.
    #[serde(rename = "From", default)]
    pub from: String,
    /// Message text.
    #[serde(rename = "Body", default)]
    pub body: String,
}

/// Builds the router with every webhook route.
pub fn build_router(state: Arc<AppState>) -> Router {
    let sounds = ServeDir::new(state.public_dir.join("sounds"));
    Router::new()
        .route("/incoming-sms", post(handle_incoming_sms))
        .route("/incoming-call", post(voice::handle_incoming_call))
        .route("/catfacts-call-menu", post(voice::handle_menu_selection))
        .nest_service("/sounds", sounds)
        .with_state(state)
}

/// `POST /incoming-sms`
async fn handle_incoming_sms(
    State(state): State<Arc<AppState>>,
    Form(sms): Form<InboundSms>,
) -> Response {
    debug!(from = %sms.from, "inbound sms");
    match state.coordinator.submit(sms.from, sms.body).await {
        Ok(outcome) if outcome.from_admin() => (StatusCode::OK, SMS_ACK).into_response(),
        Ok(_) => StatusCode::OK.into_response(),
        Err(e) => {
            warn!(error = %e, "dropping inbound sms");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

// ============================================================================
// Server
// ============================================================================

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Address to bind to, e.g. `"0.0.0.0:8080"`.
    pub bind_addr: String,
}

/// A running HTTP server.
#[derive(Debug)]
pub struct HttpServer {
    handle: JoinHandle<Result<(), TransportError>>,
}

impl HttpServer {
    /// Binds the listener and starts serving in the background.
    ///
    /// Returns the server and the actual bound address (useful when binding
    /// to port 0 in tests). Serving stops when `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the TCP listener cannot bind.
    pub async fn bind(
        config: &HttpConfig,
        state: Arc<AppState>,
        cancel: CancellationToken,
    ) -> Result<(Self, SocketAddr), TransportError> {
        let listener = TcpListener::bind(&config.bind_addr)
            .await
            .map_err(|e| TransportError::ConnectionFailed(format!("bind failed: {e}")))?;

        let bound_addr = listener
            .local_addr()
            .map_err(|e| TransportError::ConnectionFailed(format!("local_addr failed: {e}")))?;

        let router = build_router(state);
        let handle = tokio::spawn(async move {
            info!(%bound_addr, "HTTP server started");
            axum::serve(listener, router)
                .with_graceful_shutdown(async move { cancel.cancelled().await })
                .await?;
            debug!("HTTP server shut down");
            Ok::<(), TransportError>(())
        });

        Ok((Self { handle }, bound_addr))
    }

    /// Waits for the server to finish shutting down.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Io`] if serving failed or the server task
    /// panicked.
    pub async fn wait(self) -> Result<(), TransportError> {
        self.handle
            .await
            .map_err(|e| TransportError::Io(std::io::Error::other(e)))?
    }
}

/// Parses a bind address string, accepting `:port`, `port`, or `host:port`.
///
/// # Errors
///
/// Returns [`TransportError::ConnectionFailed`] if the result is not a socket
/// address.
pub fn parse_bind_addr(input: &str) -> Result<String, TransportError> {
    let addr = if input.starts_with(':') {
        format!("0.0.0.0{input}")
    } else if input.parse::<u16>().is_ok() {
        format!("0.0.0.0:{input}")
    } else {
        input.to_string()
    };
    addr.parse::<SocketAddr>().map_err(|e| {
        TransportError::ConnectionFailed(format!("invalid bind address \"{input}\": {e}"))
    })?;
    Ok(addr)
}

// ============================================================================
// Tests
// ============================================================================
