//! Canned SMS texts sent by the coordinator.

use crate::command::STOP_KEYWORD;

/// Reply to a target who texts the service while under attack.
pub const DEFLECTION: &str = "Command not recognized. We will upgrade your CatFacts account to send you facts more frequently. Thanks for choosing CatFacts!";

/// Tells the admin the worker rejected `target`.
#[must_use]
pub fn invalid_target(target: &str) -> String {
    format!("Oops! {target} doesn't appear to be a valid number. Attack NOT Launched!")
}

/// Confirms the launch and reminds the admin how to stop it.
#[must_use]
pub fn attack_launched(target: &str) -> String {
    format!(
        "Attack Vector Confirmed: CatFacts Bombardment Underway! - Text: \"{STOP_KEYWORD} {target}\" to stop attack."
    )
}

/// Confirms an admin-requested stop.
#[must_use]
pub fn attack_stopped(target: &str) -> String {
    format!("Successfully terminated CatFacts Attack on {target}")
}

/// Reports that the worker ran out of facts.
#[must_use]
pub fn attack_exhausted(target: &str) -> String {
    format!("CatFacts Attack on {target} ran out of facts! Attack Complete.")
}
