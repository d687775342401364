//! Structured event stream for `catfacts`.
//!
//! Discrete, typed events emitted as attacks move through their lifecycle.
//! Events are serialized as newline-delimited JSON (JSONL) and carry a
//! monotonically increasing sequence number.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted during `catfacts` operation.
///
/// Each variant is tagged with `"type"` when serialized to JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The HTTP listener is up.
    ServerStarted {
        /// When the server started.
        timestamp: DateTime<Utc>,
        /// Address the listener is bound to.
        bind_addr: String,
        /// Notifier in use (`"twilio"` or `"log"`).
        notifier: String,
    },

    /// The server has stopped.
    ServerStopped {
        /// When the server stopped.
        timestamp: DateTime<Utc>,
        /// Human-readable stop reason.
        reason: String,
    },

    /// An inbound SMS was processed.
    CommandReceived {
        /// When the command was handled.
        timestamp: DateTime<Utc>,
        /// Sender as reported by the gateway.
        from: String,
        /// What the coordinator did with it.
        outcome: String,
    },

    /// A worker validated its target and started sending.
    AttackLaunched {
        /// When the attack was registered.
        timestamp: DateTime<Utc>,
        /// Target number.
        target: String,
        /// Admin who requested it.
        admin: String,
    },

    /// A worker rejected its target.
    AttackRejected {
        /// When the rejection arrived.
        timestamp: DateTime<Utc>,
        /// The rejected target text.
        target: String,
        /// Admin who requested it.
        admin: String,
    },

    /// An admin stopped an attack.
    AttackStopped {
        /// When the attack was stopped.
        timestamp: DateTime<Utc>,
        /// Target number.
        target: String,
        /// Admin who stopped it.
        admin: String,
        /// How long the attack ran.
        duration_secs: i64,
    },

    /// A worker ran out of facts.
    AttackExhausted {
        /// When the attack ended.
        timestamp: DateTime<Utc>,
        /// Target number.
        target: String,
        /// Admin who started it.
        admin: String,
        /// How long the attack ran.
        duration_secs: i64,
    },
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

/// Wraps an [`Event`] with a monotonically increasing sequence number.
#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Serialization or I/O failures are silently dropped; the event stream is
/// best-effort.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

// Box<dyn Write> is not Debug
impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates an emitter that silently discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
