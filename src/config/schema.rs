//! Configuration schema types.
//!
//! Deserialized from a YAML or JSON file. The key names of the legacy
//! `config.json` layout (`catfacts_number`, `attackInterval`) are accepted as
//! aliases.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default delay between facts: one minute.
pub const DEFAULT_ATTACK_INTERVAL_MS: u64 = 60_000;

/// Root configuration for the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CatFactsConfig {
    /// Twilio account SID. Blank or absent means dry-run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twilio_sid: Option<String>,

    /// Twilio auth token. Blank or absent means dry-run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twilio_auth_token: Option<String>,

    /// Override for the Twilio REST base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twilio_api_base: Option<String>,

    /// Number every outbound message appears to come from
    #[serde(alias = "catfacts_number")]
    pub sender: String,

    /// Numbers allowed to start and stop attacks, exactly as the gateway
    /// reports them (usually `+1XXXXXXXXXX`).
    #[serde(default)]
    pub authorized_users: Vec<String>,

    /// Milliseconds between facts
    #[serde(default = "default_attack_interval_ms", alias = "attackInterval")]
    pub attack_interval_ms: u64,

    /// Public base URL used in voice-menu callbacks and sound URLs
    #[serde(default)]
    pub server_root: String,

    /// JSON array of facts
    #[serde(default = "default_facts_file")]
    pub facts_file: PathBuf,

    /// Directory served under `/sounds`
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
}

const fn default_attack_interval_ms() -> u64 {
    DEFAULT_ATTACK_INTERVAL_MS
}

fn default_facts_file() -> PathBuf {
    PathBuf::from("data/catfacts.json")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

impl CatFactsConfig {
    /// Creates a config with defaults for everything but the sender.
    #[must_use]
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            twilio_sid: None,
            twilio_auth_token: None,
            twilio_api_base: None,
            sender: sender.into(),
            authorized_users: Vec::new(),
            attack_interval_ms: DEFAULT_ATTACK_INTERVAL_MS,
            server_root: String::new(),
            facts_file: default_facts_file(),
            public_dir: default_public_dir(),
        }
    }

    /// Delay between facts.
    #[must_use]
    pub const fn attack_interval(&self) -> Duration {
        Duration::from_millis(self.attack_interval_ms)
    }

    /// Returns `(sid, token)` when both are set and non-blank.
    #[must_use]
    pub fn twilio_credentials(&self) -> Option<(&str, &str)> {
        let sid = non_blank(self.twilio_sid.as_deref())?;
        let token = non_blank(self.twilio_auth_token.as_deref())?;
        Some((sid, token))
    }

    /// `server_root` without a trailing slash.
    #[must_use]
    pub fn server_root(&self) -> &str {
        self.server_root.trim_end_matches('/')
    }

    /// Resolves relative file paths against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        if self.facts_file.is_relative() {
            self.facts_file = base.join(&self.facts_file);
        }
        if self.public_dir.is_relative() {
            self.public_dir = base.join(&self.public_dir);
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_keys_are_accepted() {
        let yaml = r#"
twilio_sid: AC123
twilio_auth_token: secret
catfacts_number: "+15550001111"
authorized_users: ["+15551234567"]
attackInterval: 5000
server_root: "https://catfacts.example.com/"
"#;
        let config: CatFactsConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.sender, "+15550001111");
        assert_eq!(config.attack_interval(), Duration::from_secs(5));
        assert_eq!(config.server_root(), "https://catfacts.example.com");
        assert_eq!(config.twilio_credentials(), Some(("AC123", "secret")));
        assert_eq!(config.facts_file, PathBuf::from("data/catfacts.json"));
    }

    #[test]
    fn json_is_valid_yaml() {
        let json = r#"{"sender": "+15550001111", "attack_interval_ms": 250}"#;
        let config: CatFactsConfig = serde_yaml::from_str(json).unwrap();
        assert_eq!(config.attack_interval_ms, 250);
        assert!(config.authorized_users.is_empty());
        assert_eq!(config.public_dir, PathBuf::from("public"));
    }

    #[test]
    fn blank_credentials_mean_dry_run() {
        let mut config = CatFactsConfig::new("+15550001111");
        assert!(config.twilio_credentials().is_none());

        config.twilio_sid = Some("AC123".into());
        config.twilio_auth_token = Some("  ".into());
        assert!(config.twilio_credentials().is_none());
    }

    #[test]
    fn resolve_paths_keeps_absolute() {
        let mut config = CatFactsConfig::new("+15550001111");
        config.public_dir = PathBuf::from("/srv/sounds");
        config.resolve_paths(Path::new("/etc/catfacts"));
        assert_eq!(
            config.facts_file,
            PathBuf::from("/etc/catfacts/data/catfacts.json")
        );
        assert_eq!(config.public_dir, PathBuf::from("/srv/sounds"));
    }

    #[test]
    fn sender_is_required() {
        let result: Result<CatFactsConfig, _> = serde_yaml::from_str("authorized_users: []");
        assert!(result.is_err());
    }
}
