//! Error taxonomy for the setup flow.
//!
//! Only [`SetupError`] is fatal. Everything else is logged by the flow, which
//! then either stays on the current page or re-renders it with a message.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use lantern_config::ConfigError;

/// A navigation location that could not be turned into a flow event.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("login location carries no arguments: {location}")]
    MissingLoginArguments { location: String },
    #[error("malformed percent escape at byte {offset} of {input:?}")]
    MalformedEscape { input: String, offset: usize },
    #[error("decoded suffix is not valid UTF-8: {input:?}")]
    InvalidUtf8 { input: String },
}

/// Contact lookup failures. All of them surface as the generic login error.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Please enter an e-mail address.")]
    MissingIdentifier,
    #[error("Please enter a password.")]
    MissingCredential,
    #[error("credentials rejected for {identifier}")]
    Rejected { identifier: String },
    #[error("directory unreachable at {}: {source}", path.display())]
    Unreachable { path: PathBuf, source: io::Error },
    #[error("directory data at {} is malformed: {source}", path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("gave up after {attempts} attempt(s): {last}")]
    Exhausted {
        attempts: u32,
        last: Box<DirectoryError>,
    },
}

impl DirectoryError {
    /// Transient failures worth another attempt.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}

/// A template could not be loaded, or its rendered copy could not be stored.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template {name} not found")]
    NotFound { name: String },
    #[error("failed to read template {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write rendered page {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Durable state could not be loaded or saved. Never fatal.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("{} holds invalid JSON: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode {what}: {source}")]
    Encode {
        what: &'static str,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// The working area could not be prepared. Aborts startup.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to create the template working area: {0}")]
    Workspace(#[source] io::Error),
    #[error("failed to copy templates from {}: {source}", path.display())]
    CopyTemplates { path: PathBuf, source: io::Error },
}
