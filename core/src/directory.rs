//! Contact directory lookups and their retry budget.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use serde::Deserialize;
use sha2::{Digest, Sha256};

use lantern_types::ContactEntry;

use crate::errors::DirectoryError;

/// Source of a user's contacts.
///
/// Calls block until the lookup succeeds or `max_attempts` is spent. The
/// identifier is already normalized (`local@domain`).
pub trait ContactDirectory {
    fn fetch_contacts(
        &self,
        identifier: &str,
        credential: &str,
        max_attempts: u32,
    ) -> Result<Vec<ContactEntry>, DirectoryError>;
}

/// Exponential backoff between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(initial_delay: Duration) -> Self {
        Self {
            initial_delay,
            ..Self::default()
        }
    }

    /// `initial_delay * 2^step`, capped at `max_delay`.
    #[must_use]
    pub fn delay_for(&self, step: u32) -> Duration {
        self.initial_delay
            .saturating_mul(1_u32 << step.min(16))
            .min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or has
    /// been tried `max_attempts` times. A budget of zero still tries once.
    pub fn run<T>(
        &self,
        max_attempts: u32,
        mut op: impl FnMut(u32) -> Result<T, DirectoryError>,
    ) -> Result<T, DirectoryError> {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = self.delay_for(attempt - 1);
                    tracing::warn!(attempt, max_attempts, ?delay, "Directory lookup failed: {e}");
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) if e.is_retryable() => {
                    return Err(DirectoryError::Exhausted {
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct DirectoryFile {
    #[serde(default)]
    accounts: BTreeMap<String, Account>,
}

#[derive(Debug, Deserialize)]
struct Account {
    secret_sha256: String,
    #[serde(default)]
    contacts: Vec<ContactEntry>,
}

/// Directory backed by a local JSON export.
///
/// ```json
/// { "accounts": { "alice@gmail.com": {
///     "secret_sha256": "<hex sha-256 of the password>",
///     "contacts": [ { "id": "bob@gmail.com", "name": "Bob" } ] } } }
/// ```
///
/// The file is re-read on every attempt. Read failures are retried; a bad
/// password, an unknown account or malformed JSON are not.
#[derive(Debug, Clone)]
pub struct JsonDirectory {
    path: PathBuf,
    retry: RetryPolicy,
}

impl JsonDirectory {
    pub fn new(path: impl Into<PathBuf>, retry: RetryPolicy) -> Self {
        Self {
            path: path.into(),
            retry,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lookup_once(
        &self,
        identifier: &str,
        credential: &str,
    ) -> Result<Vec<ContactEntry>, DirectoryError> {
        let raw = fs::read(&self.path).map_err(|source| DirectoryError::Unreachable {
            path: self.path.clone(),
            source,
        })?;
        let mut file: DirectoryFile =
            serde_json::from_slice(&raw).map_err(|source| DirectoryError::Malformed {
                path: self.path.clone(),
                source,
            })?;
        let rejected = || DirectoryError::Rejected {
            identifier: identifier.to_string(),
        };
        let account = file.accounts.remove(identifier).ok_or_else(rejected)?;
        if !account
            .secret_sha256
            .trim()
            .eq_ignore_ascii_case(&secret_digest(credential))
        {
            return Err(rejected());
        }
        Ok(account.contacts)
    }
}

impl ContactDirectory for JsonDirectory {
    fn fetch_contacts(
        &self,
        identifier: &str,
        credential: &str,
        max_attempts: u32,
    ) -> Result<Vec<ContactEntry>, DirectoryError> {
        let contacts = self.retry.run(max_attempts, |attempt| {
            tracing::debug!(identifier, attempt, "Looking up contacts");
            self.lookup_once(identifier, credential)
        })?;
        tracing::info!(identifier, count = contacts.len(), "Fetched contacts");
        Ok(contacts)
    }
}

/// Lowercase hex SHA-256 of `secret`.
#[must_use]
pub fn secret_digest(secret: &str) -> String {
    format!("{:x}", Sha256::digest(secret.as_bytes()))
}
