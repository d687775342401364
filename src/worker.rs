//! Attack workers.
//!
//! A worker is one tokio task bound to one target. It never touches
//! coordinator state: it reports its progress as [`LifecycleSignal`]s over a
//! channel and is stopped from the outside by [`WorkerHandle::terminate`].
//!
//! A worker does not stop itself. After signalling `Invalid` or `Exhausted`
//! it parks until the coordinator terminates it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::content::{ContentQueue, ContentSource};
use crate::notifier::{self, Notifier};
use crate::phone;

/// Shortest interval a worker will tick at.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Identifies one spawned worker.
pub type WorkerId = Uuid;

/// State transition reported by a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// The target failed validation; nothing will be sent.
    Invalid,
    /// The target is valid and sending has begun.
    Starting,
    /// The fact queue ran dry.
    Exhausted,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Invalid => "invalid",
            Self::Starting => "starting",
            Self::Exhausted => "exhausted",
        })
    }
}

/// One-way message from a worker to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleSignal {
    /// Worker that sent the signal.
    pub worker: WorkerId,
    /// Admin who requested the attack.
    pub admin: String,
    /// Target the worker was spawned for.
    pub target: String,
    /// What happened.
    pub kind: SignalKind,
}

/// Settings shared by every worker.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    /// Number the facts appear to come from.
    pub sender: String,
    /// Delay between facts. The first fact goes out one interval after start.
    pub interval: Duration,
}

/// Owning handle to a running worker.
///
/// Dropping the handle terminates the worker.
pub struct WorkerHandle {
    id: WorkerId,
    admin: String,
    target: String,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl fmt::Debug for WorkerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerHandle")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("terminated", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl WorkerHandle {
    /// Worker id, matching [`LifecycleSignal::worker`].
    #[must_use]
    pub const fn id(&self) -> WorkerId {
        self.id
    }

    /// Admin who requested the attack.
    #[must_use]
    pub fn admin(&self) -> &str {
        &self.admin
    }

    /// Target the worker was spawned for.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Stops the worker immediately, abandoning any pending tick or send.
    pub fn terminate(&self) {
        if !self.cancel.is_cancelled() {
            debug!(worker = %self.id, number = %self.target, "terminating worker");
        }
        self.cancel.cancel();
        self.task.abort();
    }

    /// Whether the worker task has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Spawns workers that share a notifier, fact source and signal channel.
pub struct WorkerFactory {
    notifier: Arc<dyn Notifier>,
    content: ContentSource,
    settings: WorkerSettings,
    signals: mpsc::UnboundedSender<LifecycleSignal>,
    cancel: CancellationToken,
}

impl WorkerFactory {
    /// Creates a factory. Every spawned worker is cancelled along with `cancel`.
    #[must_use]
    pub fn new(
        notifier: Arc<dyn Notifier>,
        content: ContentSource,
        settings: WorkerSettings,
        signals: mpsc::UnboundedSender<LifecycleSignal>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            notifier,
            content,
            settings,
            signals,
            cancel,
        }
    }

    /// Spawns a worker attacking `target` on behalf of `admin`.
    ///
    /// The target is not checked here; the worker validates it and reports
    /// back.
    #[must_use]
    pub fn spawn(&self, admin: &str, target: &str) -> WorkerHandle {
        let id = Uuid::new_v4();
        let cancel = self.cancel.child_token();
        let worker = Worker {
            id,
            admin: admin.to_string(),
            target: target.to_string(),
            queue: self.content.queue(),
            notifier: Arc::clone(&self.notifier),
            settings: self.settings.clone(),
            signals: self.signals.clone(),
            cancel: cancel.clone(),
        };

        info!(worker = %id, number = %target, %admin, "spawning worker");
        let task = tokio::spawn(worker.run());

        WorkerHandle {
            id,
            admin: admin.to_string(),
            target: target.to_string(),
            cancel,
            task,
        }
    }
}

/// State moved into the worker task.
struct Worker {
    id: WorkerId,
    admin: String,
    target: String,
    queue: ContentQueue,
    notifier: Arc<dyn Notifier>,
    settings: WorkerSettings,
    signals: mpsc::UnboundedSender<LifecycleSignal>,
    cancel: CancellationToken,
}

impl Worker {
    async fn run(mut self) {
        if !phone::is_valid_target(&self.target) {
            debug!(worker = %self.id, number = %self.target, "target failed validation");
            self.signal(SignalKind::Invalid);
            self.cancel.cancelled().await;
            return;
        }

        self.signal(SignalKind::Starting);

        let interval = self.settings.interval.max(MIN_INTERVAL);
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let Some(fact) = self.queue.pop() else {
                self.signal(SignalKind::Exhausted);
                self.cancel.cancelled().await;
                break;
            };

            debug!(
                worker = %self.id,
                number = %self.target,
                remaining = self.queue.len(),
                "sending fact"
            );

            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                _ = notifier::deliver(
                    self.notifier.as_ref(),
                    &self.target,
                    &self.settings.sender,
                    &fact,
                ) => {}
            }
        }

        debug!(worker = %self.id, number = %self.target, "worker stopped");
    }

    /// Reports a transition, unless the worker has already been terminated.
    fn signal(&self, kind: SignalKind) {
        if self.cancel.is_cancelled() {
            return;
        }
        // A closed channel means the coordinator is gone; nothing to tell.
        let _ = self.signals.send(LifecycleSignal {
            worker: self.id,
            admin: self.admin.clone(),
            target: self.target.clone(),
            kind,
        });
    }
}
