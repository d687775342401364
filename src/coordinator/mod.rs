//! Attack coordinator.
//!
//! The [`Coordinator`] is the single owner of attack state. It runs one
//! control loop that handles inbound SMS commands and worker lifecycle
//! signals in arrival order, so the registry needs no locking. Other tasks
//! talk to it through a cloneable [`CoordinatorHandle`].
//!
//! An attack is only registered once its worker reports `Starting`. Until
//! then the worker is tracked as pending, which is enough to reject a second
//! start for the same target but does not make the target count as under
//! attack.

pub mod messages;
pub mod registry;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{self, Command};
use crate::content::ContentSource;
use crate::error::TransportError;
use crate::notifier::{self, Notifier};
use crate::observability::events::{Event, EventEmitter};
use crate::observability::metrics;
use crate::phone;
use crate::worker::{LifecycleSignal, SignalKind, WorkerFactory, WorkerId, WorkerSettings};

pub use registry::{AdminAllowList, Attack, AttackRegistry, AttackStatus};

/// Capacity of the inbound request queue.
const REQUEST_QUEUE_CAPACITY: usize = 64;

// ============================================================================
// CommandOutcome
// ============================================================================

/// What the coordinator did with an inbound SMS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A non-admin under attack texted in and got the canned reply.
    Deflected,
    /// Sender is not an admin; nothing was sent.
    Ignored,
    /// Admin sent a blank message.
    Unrecognized,
    /// A worker was spawned for the target.
    StartRequested {
        /// Target handed to the worker.
        target: String,
    },
    /// The target already has an attack; nothing changed.
    DuplicateIgnored {
        /// The duplicate target.
        target: String,
    },
    /// The attack was terminated and the admin notified.
    Stopped {
        /// The stopped target.
        target: String,
    },
    /// No attack on the target; nothing changed.
    StopNotFound {
        /// The requested target.
        target: String,
    },
}

impl CommandOutcome {
    /// Fixed label for logs, events and metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Deflected => "deflected",
            Self::Ignored => "ignored",
            Self::Unrecognized => "unrecognized",
            Self::StartRequested { .. } => "start_requested",
            Self::DuplicateIgnored { .. } => "duplicate_ignored",
            Self::Stopped { .. } => "stopped",
            Self::StopNotFound { .. } => "stop_not_found",
        }
    }

    /// Whether the sender was an admin.
    #[must_use]
    pub const fn from_admin(&self) -> bool {
        !matches!(self, Self::Deflected | Self::Ignored)
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Message sent from a [`CoordinatorHandle`] to the control loop.
#[derive(Debug)]
pub enum Request {
    /// An inbound SMS.
    Command {
        /// Sender as reported by the gateway.
        from: String,
        /// Message body.
        payload: String,
        /// Receives the outcome.
        reply: oneshot::Sender<CommandOutcome>,
    },
    /// Registry membership query.
    IsUnderAttack {
        /// Number to check, with or without `+1`.
        target: String,
        /// Receives the answer.
        reply: oneshot::Sender<bool>,
    },
    /// Snapshot of registered targets.
    ActiveAttacks {
        /// Receives the sorted target list.
        reply: oneshot::Sender<Vec<String>>,
    },
}

/// Cloneable front door to a running [`Coordinator`].
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<Request>,
}

impl CoordinatorHandle {
    /// Hands an inbound SMS to the coordinator and waits for the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::CoordinatorClosed`] if the control loop has
    /// stopped.
    pub async fn submit(
        &self,
        from: impl Into<String>,
        payload: impl Into<String>,
    ) -> Result<CommandOutcome, TransportError> {
        let (reply, rx) = oneshot::channel();
        self.request(Request::Command {
            from: from.into(),
            payload: payload.into(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| TransportError::CoordinatorClosed)
    }

    /// Whether `target` is currently registered.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::CoordinatorClosed`] if the control loop has
    /// stopped.
    pub async fn is_under_attack(&self, target: impl Into<String>) -> Result<bool, TransportError> {
        let (reply, rx) = oneshot::channel();
        self.request(Request::IsUnderAttack {
            target: target.into(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| TransportError::CoordinatorClosed)
    }

    /// Registered targets, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::CoordinatorClosed`] if the control loop has
    /// stopped.
    pub async fn active_attacks(&self) -> Result<Vec<String>, TransportError> {
        let (reply, rx) = oneshot::channel();
        self.request(Request::ActiveAttacks { reply }).await?;
        rx.await.map_err(|_| TransportError::CoordinatorClosed)
    }

    async fn request(&self, request: Request) -> Result<(), TransportError> {
        self.tx
            .send(request)
            .await
            .map_err(|_| TransportError::CoordinatorClosed)
    }
}

// ============================================================================
// Coordinator
// ============================================================================

/// Everything needed to build a [`Coordinator`].
pub struct CoordinatorOptions {
    /// Numbers allowed to issue commands.
    pub admins: AdminAllowList,
    /// Outbound SMS.
    pub notifier: Arc<dyn Notifier>,
    /// Facts handed to each worker.
    pub content: ContentSource,
    /// Sender number and send interval.
    pub settings: WorkerSettings,
    /// Structured event sink.
    pub events: Arc<EventEmitter>,
    /// Parent token for every worker.
    pub cancel: CancellationToken,
}

/// Owner of the attack registry and every worker.
pub struct Coordinator {
    registry: AttackRegistry,
    pending: HashMap<WorkerId, Attack>,
    admins: AdminAllowList,
    notifier: Arc<dyn Notifier>,
    sender: String,
    workers: WorkerFactory,
    signals: mpsc::UnboundedReceiver<LifecycleSignal>,
    events: Arc<EventEmitter>,
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("active", &self.registry.len())
            .field("pending", &self.pending.len())
            .field("admins", &self.admins.len())
            .finish_non_exhaustive()
    }
}

impl Coordinator {
    /// Builds a coordinator with an empty registry.
    #[must_use]
    pub fn new(opts: CoordinatorOptions) -> Self {
        let (signal_tx, signals) = mpsc::unbounded_channel();
        let sender = opts.settings.sender.clone();
        let workers = WorkerFactory::new(
            Arc::clone(&opts.notifier),
            opts.content,
            opts.settings,
            signal_tx,
            opts.cancel,
        );

        Self {
            registry: AttackRegistry::new(),
            pending: HashMap::new(),
            admins: opts.admins,
            notifier: opts.notifier,
            sender,
            workers,
            signals,
            events: opts.events,
        }
    }

    /// Moves the coordinator onto its own task.
    ///
    /// The loop exits when `cancel` fires or every handle is dropped; either
    /// way all workers are terminated.
    #[must_use]
    pub fn start(self, cancel: CancellationToken) -> (CoordinatorHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(REQUEST_QUEUE_CAPACITY);
        let task = tokio::spawn(self.run(rx, cancel));
        (CoordinatorHandle { tx }, task)
    }

    /// The control loop.
    pub async fn run(mut self, mut requests: mpsc::Receiver<Request>, cancel: CancellationToken) {
        info!(admins = self.admins.len(), "coordinator started");

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("coordinator cancelled");
                    break;
                }
                Some(signal) = self.signals.recv() => self.handle_signal(signal),
                request = requests.recv() => {
                    let Some(request) = request else {
                        debug!("all coordinator handles dropped");
                        break;
                    };
                    self.handle_request(request);
                }
            }
        }

        self.shutdown();
    }

    fn handle_request(&mut self, request: Request) {
        match request {
            Request::Command {
                from,
                payload,
                reply,
            } => {
                let outcome = self.handle_inbound_command(&from, &payload);
                let _ = reply.send(outcome);
            }
            Request::IsUnderAttack { target, reply } => {
                let _ = reply.send(self.is_under_attack(&target));
            }
            Request::ActiveAttacks { reply } => {
                let _ = reply.send(self.active_attacks());
            }
        }
    }

    /// Applies the authorization rules to an inbound SMS and acts on it.
    ///
    /// A non-admin who is currently a target gets the deflection text. Any
    /// other non-admin is ignored without a reply.
    pub fn handle_inbound_command(&mut self, from: &str, payload: &str) -> CommandOutcome {
        let authorized = self.admins.is_authorized(from);

        let outcome = if !authorized && self.is_under_attack(from) {
            info!(%from, "target texted in, sending deflection");
            self.notify(from, messages::DEFLECTION.to_string());
            CommandOutcome::Deflected
        } else if !authorized {
            debug!(%from, "ignoring command from unauthorized sender");
            CommandOutcome::Ignored
        } else {
            match command::classify(payload) {
                Command::Stop(target) => self.stop_attack(from, &target),
                Command::Start(target) => self.start_attack(from, &target),
                Command::Unrecognized => CommandOutcome::Unrecognized,
            }
        };

        metrics::record_command(outcome.label());
        self.events.emit(Event::CommandReceived {
            timestamp: Utc::now(),
            from: from.to_string(),
            outcome: outcome.label().to_string(),
        });
        outcome
    }

    /// Spawns a worker for `target` unless it already has one.
    ///
    /// The attack is not registered until the worker signals `Starting`.
    pub fn start_attack(&mut self, admin: &str, target: &str) -> CommandOutcome {
        let key = phone::normalize(target);
        let pending = self
            .pending
            .values()
            .any(|attack| phone::normalize(attack.target()) == key);

        if pending || self.registry.contains(target) {
            debug!(number = %target, pending, "target already under attack");
            return CommandOutcome::DuplicateIgnored {
                target: target.to_string(),
            };
        }

        let attack = Attack::new(self.workers.spawn(admin, target));
        self.pending.insert(attack.worker().id(), attack);
        CommandOutcome::StartRequested {
            target: target.to_string(),
        }
    }

    /// Terminates the attack on `target` and confirms to `admin`.
    ///
    /// Silent when there is no such attack.
    pub fn stop_attack(&mut self, admin: &str, target: &str) -> CommandOutcome {
        let Some(attack) = self.registry.remove(target) else {
            debug!(number = %target, "stop requested for target not under attack");
            return CommandOutcome::StopNotFound {
                target: target.to_string(),
            };
        };

        let attack_target = attack.target().to_string();
        let duration_secs = attack.finish(AttackStatus::Stopped);
        info!(number = %attack_target, %admin, duration_secs, "attack stopped");

        metrics::record_attack("stopped");
        metrics::set_active_attacks(self.registry.len());
        self.events.emit(Event::AttackStopped {
            timestamp: Utc::now(),
            target: attack_target,
            admin: admin.to_string(),
            duration_secs,
        });
        self.notify(admin, messages::attack_stopped(target));

        CommandOutcome::Stopped {
            target: target.to_string(),
        }
    }

    /// Whether `target` (with or without `+1`) is registered.
    #[must_use]
    pub fn is_under_attack(&self, target: &str) -> bool {
        self.registry.contains(target)
    }

    /// Registered targets, sorted.
    #[must_use]
    pub fn active_attacks(&self) -> Vec<String> {
        self.registry.targets()
    }

    /// Number of spawned workers that have not yet signalled.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Waits for the next worker signal.
    ///
    /// Exposed so the lifecycle can be driven step by step without
    /// [`run`](Self::run).
    pub async fn next_signal(&mut self) -> Option<LifecycleSignal> {
        self.signals.recv().await
    }

    /// Reacts to a worker's lifecycle signal.
    pub fn handle_signal(&mut self, signal: LifecycleSignal) {
        debug!(worker = %signal.worker, kind = %signal.kind, "worker signal");
        match signal.kind {
            SignalKind::Invalid => self.on_invalid(&signal),
            SignalKind::Starting => self.on_starting(&signal),
            SignalKind::Exhausted => self.on_exhausted(&signal),
        }
    }

    fn on_invalid(&mut self, signal: &LifecycleSignal) {
        let Some(attack) = self.pending.remove(&signal.worker) else {
            debug!(worker = %signal.worker, "invalid signal from unknown worker");
            return;
        };

        attack.finish(AttackStatus::Invalid);
        info!(number = %signal.target, admin = %signal.admin, "target rejected");

        metrics::record_attack("invalid");
        self.events.emit(Event::AttackRejected {
            timestamp: Utc::now(),
            target: signal.target.clone(),
            admin: signal.admin.clone(),
        });
        self.notify(&signal.admin, messages::invalid_target(&signal.target));
    }

    fn on_starting(&mut self, signal: &LifecycleSignal) {
        let Some(mut attack) = self.pending.remove(&signal.worker) else {
            debug!(worker = %signal.worker, "starting signal from unknown worker");
            return;
        };

        attack.mark_running();
        if let Err(duplicate) = self.registry.insert(attack) {
            warn!(number = %signal.target, "target registered twice, dropping newer worker");
            duplicate.finish(AttackStatus::Stopped);
            return;
        }

        info!(number = %signal.target, admin = %signal.admin, "attack launched");
        metrics::record_attack("launched");
        metrics::set_active_attacks(self.registry.len());
        self.events.emit(Event::AttackLaunched {
            timestamp: Utc::now(),
            target: signal.target.clone(),
            admin: signal.admin.clone(),
        });
        self.notify(&signal.admin, messages::attack_launched(&signal.target));
    }

    fn on_exhausted(&mut self, signal: &LifecycleSignal) {
        let owned = self
            .registry
            .get(&signal.target)
            .is_some_and(|attack| attack.worker().id() == signal.worker);
        let attack = if owned {
            self.registry.remove(&signal.target)
        } else {
            self.pending.remove(&signal.worker)
        };
        let Some(attack) = attack else {
            debug!(worker = %signal.worker, "exhausted signal from unknown worker");
            return;
        };

        let duration_secs = attack.finish(AttackStatus::Exhausted);
        info!(number = %signal.target, duration_secs, "attack exhausted");

        metrics::record_attack("exhausted");
        metrics::set_active_attacks(self.registry.len());
        self.events.emit(Event::AttackExhausted {
            timestamp: Utc::now(),
            target: signal.target.clone(),
            admin: signal.admin.clone(),
            duration_secs,
        });
        self.notify(&signal.admin, messages::attack_exhausted(&signal.target));
    }

    /// Terminates every registered and pending worker.
    pub fn shutdown(&mut self) {
        let count = self.registry.len() + self.pending.len();
        for attack in self.registry.drain() {
            attack.finish(AttackStatus::Stopped);
        }
        for (_, attack) in self.pending.drain() {
            attack.finish(AttackStatus::Stopped);
        }
        metrics::set_active_attacks(0);
        if count > 0 {
            info!(count, "terminated remaining workers");
        }
    }

    /// Texts `to` from the service number without waiting for delivery.
    fn notify(&self, to: &str, body: String) {
        notifier::deliver_detached(
            Arc::clone(&self.notifier),
            to.to_string(),
            self.sender.clone(),
            body,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::testing::{RecordingNotifier, Sent};
    use std::time::Duration;

    const ADMIN: &str = "+15551234567";
    const TARGET: &str = "5559998888";
    const SENDER: &str = "+15550001111";
    const TIMEOUT: Duration = Duration::from_secs(5);

    fn coordinator(
        facts: &[&str],
        interval: Duration,
    ) -> (Coordinator, mpsc::UnboundedReceiver<Sent>) {
        let (notifier, sent) = RecordingNotifier::new();
        let coordinator = Coordinator::new(CoordinatorOptions {
            admins: AdminAllowList::new([ADMIN]),
            notifier,
            content: ContentSource::new(facts.iter().map(ToString::to_string).collect()),
            settings: WorkerSettings {
                sender: SENDER.to_string(),
                interval,
            },
            events: Arc::new(EventEmitter::noop()),
            cancel: CancellationToken::new(),
        });
        (coordinator, sent)
    }

    /// A coordinator whose workers never tick during a test.
    fn idle_coordinator() -> (Coordinator, mpsc::UnboundedReceiver<Sent>) {
        coordinator(&["fact"], Duration::from_secs(3600))
    }

    async fn step(coordinator: &mut Coordinator) -> SignalKind {
        let signal = tokio::time::timeout(TIMEOUT, coordinator.next_signal())
            .await
            .expect("timed out waiting for signal")
            .expect("signal channel closed");
        let kind = signal.kind;
        coordinator.handle_signal(signal);
        kind
    }

    async fn next_sent(rx: &mut mpsc::UnboundedReceiver<Sent>) -> Sent {
        tokio::time::timeout(TIMEOUT, rx.recv())
            .await
            .expect("timed out waiting for notification")
            .expect("notifier channel closed")
    }

    async fn assert_nothing_sent(rx: &mut mpsc::UnboundedReceiver<Sent>) {
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err(), "unexpected notification");
    }

    #[tokio::test]
    async fn start_registers_on_starting_signal() {
        let (mut c, mut sent) = idle_coordinator();

        let outcome = c.handle_inbound_command(ADMIN, TARGET);
        assert_eq!(
            outcome,
            CommandOutcome::StartRequested {
                target: TARGET.to_string()
            }
        );
        assert!(!c.is_under_attack(TARGET));
        assert_eq!(c.pending_count(), 1);

        assert_eq!(step(&mut c).await, SignalKind::Starting);
        assert!(c.is_under_attack(TARGET));
        assert!(c.is_under_attack("+15559998888"));
        assert_eq!(c.pending_count(), 0);
        assert_eq!(c.active_attacks(), vec![TARGET.to_string()]);

        let msg = next_sent(&mut sent).await;
        assert_eq!(msg.to, ADMIN);
        assert_eq!(msg.from, SENDER);
        assert_eq!(msg.body, messages::attack_launched(TARGET));
    }

    #[tokio::test]
    async fn duplicate_start_before_signal_is_ignored() {
        let (mut c, _sent) = idle_coordinator();
        c.handle_inbound_command(ADMIN, TARGET);
        assert_eq!(
            c.handle_inbound_command(ADMIN, "+15559998888"),
            CommandOutcome::DuplicateIgnored {
                target: "+15559998888".to_string()
            }
        );
        assert_eq!(c.pending_count(), 1);
    }

    #[tokio::test]
    async fn duplicate_start_after_registration_is_ignored() {
        let (mut c, mut sent) = idle_coordinator();
        c.handle_inbound_command(ADMIN, TARGET);
        step(&mut c).await;
        next_sent(&mut sent).await;

        assert_eq!(
            c.handle_inbound_command(ADMIN, TARGET),
            CommandOutcome::DuplicateIgnored {
                target: TARGET.to_string()
            }
        );
        assert_eq!(c.pending_count(), 0);
        assert_eq!(c.active_attacks().len(), 1);
        assert_nothing_sent(&mut sent).await;
    }

    #[tokio::test]
    async fn stop_terminates_and_confirms() {
        let (mut c, mut sent) = idle_coordinator();
        c.handle_inbound_command(ADMIN, TARGET);
        step(&mut c).await;
        next_sent(&mut sent).await;

        let outcome = c.handle_inbound_command(ADMIN, "downboy 5559998888");
        assert_eq!(
            outcome,
            CommandOutcome::Stopped {
                target: TARGET.to_string()
            }
        );
        assert!(!c.is_under_attack(TARGET));

        let msg = next_sent(&mut sent).await;
        assert_eq!(msg.to, ADMIN);
        assert_eq!(msg.body, messages::attack_stopped(TARGET));
    }

    #[tokio::test]
    async fn stop_unknown_target_is_silent() {
        let (mut c, mut sent) = idle_coordinator();
        assert_eq!(
            c.handle_inbound_command(ADMIN, "downboy 5550000000"),
            CommandOutcome::StopNotFound {
                target: "5550000000".to_string()
            }
        );
        assert!(c.active_attacks().is_empty());
        assert_nothing_sent(&mut sent).await;
    }

    #[tokio::test]
    async fn invalid_target_notifies_admin_and_never_registers() {
        let (mut c, mut sent) = idle_coordinator();
        c.handle_inbound_command(ADMIN, "hello there");

        assert_eq!(step(&mut c).await, SignalKind::Invalid);
        assert_eq!(c.pending_count(), 0);
        assert!(c.active_attacks().is_empty());

        let msg = next_sent(&mut sent).await;
        assert_eq!(msg.to, ADMIN);
        assert_eq!(msg.body, messages::invalid_target("hello there"));
    }

    #[tokio::test]
    async fn exhaustion_removes_and_notifies() {
        let (mut c, mut sent) = coordinator(&["only fact"], Duration::from_millis(5));
        c.handle_inbound_command(ADMIN, TARGET);

        assert_eq!(step(&mut c).await, SignalKind::Starting);

        // Launch confirmation and the first fact race each other
        let first = next_sent(&mut sent).await;
        let second = next_sent(&mut sent).await;
        let fact = if first.to == TARGET { first } else { second };
        assert_eq!(fact.to, TARGET);
        assert_eq!(fact.body, "only fact");

        assert_eq!(step(&mut c).await, SignalKind::Exhausted);
        assert!(!c.is_under_attack(TARGET));

        let msg = next_sent(&mut sent).await;
        assert_eq!(msg.to, ADMIN);
        assert_eq!(msg.body, messages::attack_exhausted(TARGET));
    }

    #[tokio::test]
    async fn unauthorized_sender_is_ignored() {
        let (mut c, mut sent) = idle_coordinator();
        assert_eq!(
            c.handle_inbound_command("+15550000000", TARGET),
            CommandOutcome::Ignored
        );
        assert_eq!(c.pending_count(), 0);
        assert_nothing_sent(&mut sent).await;
    }

    #[tokio::test]
    async fn target_texting_in_is_deflected() {
        let (mut c, mut sent) = idle_coordinator();
        c.handle_inbound_command(ADMIN, TARGET);
        step(&mut c).await;
        next_sent(&mut sent).await;

        let outcome = c.handle_inbound_command("+15559998888", "STOP");
        assert_eq!(outcome, CommandOutcome::Deflected);
        assert!(!outcome.from_admin());
        assert!(c.is_under_attack(TARGET));

        let msg = next_sent(&mut sent).await;
        assert_eq!(msg.to, "+15559998888");
        assert_eq!(msg.body, messages::DEFLECTION);
    }

    #[tokio::test]
    async fn blank_admin_message_is_unrecognized() {
        let (mut c, mut sent) = idle_coordinator();
        assert_eq!(
            c.handle_inbound_command(ADMIN, "   "),
            CommandOutcome::Unrecognized
        );
        assert_eq!(c.pending_count(), 0);
        assert_nothing_sent(&mut sent).await;
    }

    #[tokio::test]
    async fn shutdown_terminates_everything() {
        let (mut c, _sent) = idle_coordinator();
        c.handle_inbound_command(ADMIN, TARGET);
        step(&mut c).await;
        c.handle_inbound_command(ADMIN, "5551112222");
        assert_eq!(c.pending_count(), 1);

        c.shutdown();
        assert!(c.active_attacks().is_empty());
        assert_eq!(c.pending_count(), 0);
    }

    #[tokio::test]
    async fn handle_round_trip() {
        let (c, mut sent) = idle_coordinator();
        let cancel = CancellationToken::new();
        let (handle, task) = c.start(cancel.clone());

        let outcome = handle.submit(ADMIN, TARGET).await.unwrap();
        assert!(matches!(outcome, CommandOutcome::StartRequested { .. }));

        // Launch confirmation means the Starting signal has been processed
        assert_eq!(next_sent(&mut sent).await.to, ADMIN);
        assert!(handle.is_under_attack("+15559998888").await.unwrap());
        assert_eq!(handle.active_attacks().await.unwrap(), vec![TARGET]);

        cancel.cancel();
        task.await.unwrap();
        assert!(matches!(
            handle.submit(ADMIN, TARGET).await,
            Err(TransportError::CoordinatorClosed)
        ));
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(CommandOutcome::Ignored.label(), "ignored");
        assert_eq!(
            CommandOutcome::Stopped {
                target: String::new()
            }
            .to_string(),
            "stopped"
        );
        assert!(CommandOutcome::Unrecognized.from_admin());
    }
}
