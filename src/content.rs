//! Cat fact content.
//!
//! The facts file is a JSON array of strings. It is read once at startup
//! into a shared [`ContentSource`]; each worker then takes its own
//! [`ContentQueue`] copy and drains it.

use std::path::Path;
use std::sync::Arc;

use rand::seq::IndexedRandom;

use crate::error::ConfigError;

/// Immutable, shared list of facts loaded at startup.
#[derive(Debug, Clone)]
pub struct ContentSource {
    facts: Arc<[String]>,
}

impl ContentSource {
    /// Wraps an in-memory list of facts.
    #[must_use]
    pub fn new(facts: Vec<String>) -> Self {
        Self {
            facts: facts.into(),
        }
    }

    /// Reads a JSON array of strings from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingFile`] if the file cannot be read and
    /// [`ConfigError::ParseError`] if it is not an array of strings.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        let facts: Vec<String> =
            serde_json::from_str(&raw).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                line: Some(e.line()),
                message: e.to_string(),
            })?;
        tracing::debug!(path = %path.display(), count = facts.len(), "loaded facts");
        Ok(Self::new(facts))
    }

    /// Number of facts available.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Whether the source has no facts at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// A fresh, full queue for a new worker.
    #[must_use]
    pub fn queue(&self) -> ContentQueue {
        ContentQueue {
            remaining: self.facts.to_vec(),
        }
    }

    /// A uniformly random fact, or `None` if the source is empty.
    #[must_use]
    pub fn random(&self) -> Option<&str> {
        random_item(&self.facts[..]).map(String::as_str)
    }
}

/// Picks a uniformly random element of `items`.
#[must_use]
pub fn random_item<T>(items: &[T]) -> Option<&T> {
    items.choose(&mut rand::rng())
}

/// A worker's private, depletable supply of facts.
///
/// Facts come off the end of the loaded list, so the last fact in the file is
/// sent first.
#[derive(Debug, Clone, Default)]
pub struct ContentQueue {
    remaining: Vec<String>,
}

impl ContentQueue {
    /// Takes the next fact, or `None` once the queue is exhausted.
    pub fn pop(&mut self) -> Option<String> {
        self.remaining.pop()
    }

    /// Whether every fact has been taken.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Facts left to send.
    #[must_use]
    pub fn len(&self) -> usize {
        self.remaining.len()
    }
}

impl From<Vec<String>> for ContentQueue {
    fn from(remaining: Vec<String>) -> Self {
        Self { remaining }
    }
}
