//! Outbound SMS delivery.
//!
//! Everything that texts a phone goes through the [`Notifier`] trait. Sends
//! are single-attempt: failures are logged and counted, never retried, and
//! never propagated to whoever triggered them.

pub mod twilio;

use std::sync::Arc;

use serde::Deserialize;
use tokio::task::JoinHandle;

use crate::error::NotifierError;
use crate::observability::metrics;

pub use twilio::{TwilioConfig, TwilioNotifier};

/// Acknowledgement returned by the gateway for an accepted message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeliveryReceipt {
    /// Gateway-assigned message id.
    pub sid: String,
    /// Gateway-reported state, e.g. `"queued"`.
    #[serde(default)]
    pub status: Option<String>,
}

/// Sends a text message from one number to another.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `body` to `to`, appearing to come from `from`.
    ///
    /// # Errors
    ///
    /// Returns a [`NotifierError`] if the gateway is unreachable or rejects
    /// the message.
    async fn send(&self, to: &str, from: &str, body: &str)
    -> Result<DeliveryReceipt, NotifierError>;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}

/// Sends one message and logs the outcome.
///
/// Returns whether the gateway accepted it.
pub async fn deliver(notifier: &dyn Notifier, to: &str, from: &str, body: &str) -> bool {
    match notifier.send(to, from, body).await {
        Ok(receipt) => {
            tracing::debug!(
                notifier = notifier.name(),
                %to,
                sid = %receipt.sid,
                "message accepted"
            );
            metrics::record_message(true);
            true
        }
        Err(e) => {
            tracing::warn!(notifier = notifier.name(), %to, error = %e, "message delivery failed");
            metrics::record_message(false);
            false
        }
    }
}

/// Fire-and-forget variant of [`deliver`] that runs on its own task.
///
/// The caller never waits on the gateway.
pub fn deliver_detached(
    notifier: Arc<dyn Notifier>,
    to: String,
    from: String,
    body: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        deliver(notifier.as_ref(), &to, &from, &body).await;
    })
}

// ============================================================================
// LogNotifier
// ============================================================================

/// Dry-run notifier that logs messages instead of sending them.
///
/// Used when no gateway credentials are configured.
#[derive(Debug, Default)]
pub struct LogNotifier {
    sent: std::sync::atomic::AtomicU64,
}

impl LogNotifier {
    /// Creates a new dry-run notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn send(
        &self,
        to: &str,
        from: &str,
        body: &str,
    ) -> Result<DeliveryReceipt, NotifierError> {
        let n = self
            .sent
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
            + 1;
        tracing::info!(%to, %from, %body, "dry-run: not sending");
        Ok(DeliveryReceipt {
            sid: format!("DRY{n:08}"),
            status: Some("dry-run".to_string()),
        })
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

// ============================================================================
// Test helpers
// ============================================================================
