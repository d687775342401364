//! Metrics collection for `catfacts`.
//!
//! Prometheus-compatible counters and gauges. Every recording function is a
//! no-op until [`init_metrics`] installs a recorder.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::CatFactsError;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`.
///
/// # Errors
///
/// Returns `CatFactsError::Io` if the recorder or HTTP listener
/// cannot be installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), CatFactsError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| CatFactsError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

/// Registers metric descriptions with the global recorder.
fn describe_metrics() {
    describe_counter!(
        "catfacts_commands_total",
        "Inbound SMS commands by outcome"
    );
    describe_counter!(
        "catfacts_attacks_total",
        "Attacks that reached a terminal state, by reason"
    );
    describe_counter!(
        "catfacts_messages_total",
        "Outbound messages by delivery status"
    );
    describe_gauge!("catfacts_attacks_active", "Currently registered attacks");
}

/// Records the outcome of an inbound command.
///
/// `outcome` comes from a fixed set of labels, never from message content.
pub fn record_command(outcome: &'static str) {
    counter!("catfacts_commands_total", "outcome" => outcome).increment(1);
}

/// Records an attack reaching `reason` (`launched`, `invalid`, `stopped`, `exhausted`).
pub fn record_attack(reason: &'static str) {
    counter!("catfacts_attacks_total", "reason" => reason).increment(1);
}

/// Records one outbound message attempt.
pub fn record_message(delivered: bool) {
    let status = if delivered { "delivered" } else { "failed" };
    counter!("catfacts_messages_total", "status" => status).increment(1);
}

/// Sets the number of registered attacks.
#[allow(clippy::cast_precision_loss)]
pub fn set_active_attacks(count: usize) {
    gauge!("catfacts_attacks_active").set(count as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        // metrics macros silently no-op when no global recorder is installed
        record_command("start");
        record_attack("launched");
        record_message(true);
        record_message(false);
        set_active_attacks(3);
    }
}
