//! Coordinator-owned state: active attacks and the admin allow-list.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};

use crate::phone;
use crate::worker::WorkerHandle;

/// Where an attack is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackStatus {
    /// Worker spawned, waiting for it to validate the target.
    Starting,
    /// Registered and sending.
    Running,
    /// Stopped by an admin.
    Stopped,
    /// Ran out of facts.
    Exhausted,
    /// Target rejected by the worker.
    Invalid,
}

impl AttackStatus {
    /// Whether the attack is over.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Exhausted | Self::Invalid)
    }
}

impl fmt::Display for AttackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Exhausted => "exhausted",
            Self::Invalid => "invalid",
        })
    }
}

/// One attack and the worker carrying it out.
#[derive(Debug)]
pub struct Attack {
    target: String,
    requesting_admin: String,
    worker: WorkerHandle,
    status: AttackStatus,
    started_at: DateTime<Utc>,
}

impl Attack {
    /// Wraps a freshly spawned worker.
    #[must_use]
    pub fn new(worker: WorkerHandle) -> Self {
        Self {
            target: worker.target().to_string(),
            requesting_admin: worker.admin().to_string(),
            worker,
            status: AttackStatus::Starting,
            started_at: Utc::now(),
        }
    }

    /// Target as the worker received it.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Admin who requested the attack.
    #[must_use]
    pub fn requesting_admin(&self) -> &str {
        &self.requesting_admin
    }

    /// The worker carrying out this attack.
    #[must_use]
    pub const fn worker(&self) -> &WorkerHandle {
        &self.worker
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> AttackStatus {
        self.status
    }

    /// When the attack entered its current run (spawn, then registration).
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Marks the attack as running and restarts its clock.
    pub fn mark_running(&mut self) {
        self.status = AttackStatus::Running;
        self.started_at = Utc::now();
    }

    /// Moves to a terminal `status`, terminates the worker, and returns how
    /// many whole seconds the attack ran.
    pub fn finish(mut self, status: AttackStatus) -> i64 {
        debug_assert!(status.is_terminal());
        self.status = status;
        self.worker.terminate();
        tracing::debug!(number = %self.target, %status, "attack finished");
        (Utc::now() - self.started_at).num_seconds()
    }
}

/// Active attacks keyed by normalized target.
///
/// At most one attack per target.
#[derive(Debug, Default)]
pub struct AttackRegistry {
    attacks: HashMap<String, Attack>,
}

impl AttackRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `attack`, handing it back if its target is already taken.
    ///
    /// # Errors
    ///
    /// Returns the rejected attack when the target is already registered.
    pub fn insert(&mut self, attack: Attack) -> Result<(), Attack> {
        let key = phone::normalize(attack.target()).to_string();
        if self.attacks.contains_key(&key) {
            return Err(attack);
        }
        self.attacks.insert(key, attack);
        Ok(())
    }

    /// Removes and returns the attack on `target`.
    pub fn remove(&mut self, target: &str) -> Option<Attack> {
        self.attacks.remove(phone::normalize(target))
    }

    /// Looks up the attack on `target`.
    #[must_use]
    pub fn get(&self, target: &str) -> Option<&Attack> {
        self.attacks.get(phone::normalize(target))
    }

    /// Whether `target` (with or without `+1`) is registered.
    #[must_use]
    pub fn contains(&self, target: &str) -> bool {
        self.attacks.contains_key(phone::normalize(target))
    }

    /// Number of registered attacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attacks.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attacks.is_empty()
    }

    /// Registered targets, sorted.
    #[must_use]
    pub fn targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = self.attacks.keys().cloned().collect();
        targets.sort();
        targets
    }

    /// Removes every attack.
    pub fn drain(&mut self) -> impl Iterator<Item = Attack> + '_ {
        self.attacks.drain().map(|(_, attack)| attack)
    }
}

/// Numbers allowed to start and stop attacks. Fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct AdminAllowList {
    admins: HashSet<String>,
}

impl AdminAllowList {
    /// Builds the list from configured numbers.
    pub fn new<I, S>(admins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            admins: admins.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact-match membership test against the sender as the gateway reports it.
    #[must_use]
    pub fn is_authorized(&self, sender: &str) -> bool {
        self.admins.contains(sender)
    }

    /// Number of admins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.admins.len()
    }

    /// Whether no one is authorized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.admins.is_empty()
    }
}
