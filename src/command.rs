//! Inbound SMS command classification.
//!
//! Admins control the service by texting it. A body of the form
//! `downboy <digits>` stops the attack on `<digits>`; any other non-blank
//! body is taken as a start request whose target is the body itself. The
//! start target is deliberately not validated here: the worker rejects
//! malformed targets after it is spawned and reports back with an
//! `Invalid` signal.

use std::fmt;

use crate::phone;

/// Keyword that turns a message into a stop request.
pub const STOP_KEYWORD: &str = "downboy";

/// A classified admin command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Launch an attack. Carries the raw message body as the presumptive target.
    Start(String),
    /// Stop the attack on the given digits-only target.
    Stop(String),
    /// Blank message; nothing to do.
    Unrecognized,
}

impl Command {
    /// Short label used in logs, events and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Start(_) => "start",
            Self::Stop(_) => "stop",
            Self::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start(target) => write!(f, "start {target}"),
            Self::Stop(target) => write!(f, "{STOP_KEYWORD} {target}"),
            Self::Unrecognized => f.write_str("unrecognized"),
        }
    }
}

/// Classifies an inbound message body.
///
/// Matching is case-insensitive. The stop keyword may appear anywhere in the
/// body; once its first occurrence is removed, the trimmed remainder must be
/// all digits for the message to count as a stop request. Everything else
/// falls through to [`Command::Start`].
#[must_use]
pub fn classify(payload: &str) -> Command {
    if payload.trim().is_empty() {
        return Command::Unrecognized;
    }

    if let Some(target) = stop_target(payload) {
        return Command::Stop(target);
    }

    Command::Start(payload.to_string())
}

/// Extracts the target of a stop request, if `payload` is one.
fn stop_target(payload: &str) -> Option<String> {
    let lowered = payload.to_lowercase();
    if !lowered.contains(STOP_KEYWORD) {
        return None;
    }

    let remainder = lowered.replacen(STOP_KEYWORD, "", 1);
    let remainder = remainder.trim();
    phone::is_valid_target(remainder).then(|| remainder.to_string())
}
