//! Configuration validation.
//!
//! Runs on the deserialized [`CatFactsConfig`] and collects every issue
//! instead of stopping at the first one.

use std::collections::HashSet;

use crate::config::schema::CatFactsConfig;
use crate::error::{Severity, ValidationIssue};
use crate::phone;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration and returns the result.
    pub fn validate(&mut self, config: &CatFactsConfig) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_sender(config);
        self.validate_admins(config);
        self.validate_interval(config);
        self.validate_credentials(config);
        self.validate_urls(config);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    fn validate_sender(&mut self, config: &CatFactsConfig) {
        let sender = config.sender.trim();
        if sender.is_empty() {
            self.add_error("sender", "Sender number is required and cannot be empty");
        } else if !phone::is_valid_target(sender.trim_start_matches('+')) {
            self.add_warning("sender", "Sender does not look like a phone number");
        }
    }

    fn validate_admins(&mut self, config: &CatFactsConfig) {
        if config.authorized_users.is_empty() {
            self.add_warning(
                "authorized_users",
                "No authorized users; every inbound command will be ignored",
            );
        }

        let mut seen = HashSet::new();
        for (i, user) in config.authorized_users.iter().enumerate() {
            let path = format!("authorized_users[{i}]");
            if user.trim().is_empty() {
                self.add_error(&path, "Authorized user cannot be empty");
            } else if user.trim() != user {
                self.add_warning(
                    &path,
                    "Surrounding whitespace will never match an inbound sender",
                );
            }
            if !seen.insert(user.as_str()) {
                self.add_warning(&path, "Duplicate authorized user");
            }
        }
    }

    fn validate_interval(&mut self, config: &CatFactsConfig) {
        if config.attack_interval_ms == 0 {
            self.add_error("attack_interval_ms", "Attack interval must be positive");
        }
    }

    fn validate_credentials(&mut self, config: &CatFactsConfig) {
        let has_sid = config
            .twilio_sid
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());
        let has_token = config
            .twilio_auth_token
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());

        match (has_sid, has_token) {
            (true, true) => {}
            (false, false) => self.add_warning(
                "twilio_sid",
                "No Twilio credentials; messages will be logged instead of sent",
            ),
            (true, false) => self.add_error(
                "twilio_auth_token",
                "Twilio auth token is required when twilio_sid is set",
            ),
            (false, true) => self.add_error(
                "twilio_sid",
                "Twilio SID is required when twilio_auth_token is set",
            ),
        }
    }

    fn validate_urls(&mut self, config: &CatFactsConfig) {
        if config.server_root.is_empty() {
            self.add_warning(
                "server_root",
                "No server root; voice menu URLs will be relative",
            );
        } else if !is_http_url(&config.server_root) {
            self.add_error("server_root", "Server root must be an http(s) URL");
        }

        if let Some(base) = &config.twilio_api_base {
            if !is_http_url(base) {
                self.add_error("twilio_api_base", "Twilio API base must be an http(s) URL");
            }
        }
    }

    /// Adds an error to the collection.
    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    /// Adds a warning to the collection.
    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}
