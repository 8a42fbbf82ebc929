//! Core domain types for the Lantern setup wizard.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod trust;
mod vars;

pub use trust::TrustSet;
pub use vars::{TemplateVariables, tokens};

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Install Mode
// ============================================================================

/// Which branch of the setup flow applies.
///
/// Censored users pick trusted friends to route through; uncensored users
/// only sign in so they can offer their connection to others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallMode {
    Censored,
    #[default]
    Uncensored,
}

impl InstallMode {
    #[must_use]
    pub const fn from_censored(censored: bool) -> Self {
        if censored {
            Self::Censored
        } else {
            Self::Uncensored
        }
    }

    #[must_use]
    pub const fn is_censored(self) -> bool {
        matches!(self, Self::Censored)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Censored => "censored",
            Self::Uncensored => "uncensored",
        }
    }

    /// Suffix used by the page templates of this branch (`install1Censored`).
    #[must_use]
    pub const fn page_suffix(self) -> &'static str {
        match self {
            Self::Censored => "Censored",
            Self::Uncensored => "Uncensored",
        }
    }
}

impl fmt::Display for InstallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Contacts
// ============================================================================

/// One entry of a user's contact list as returned by the directory service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEntry {
    #[serde(alias = "id")]
    identifier: String,
    #[serde(default, alias = "name")]
    display_name: String,
}

impl ContactEntry {
    pub fn new(identifier: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            display_name: display_name.into(),
        }
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Name to show for this contact; blank names fall back to the identifier.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.identifier
        } else {
            &self.display_name
        }
    }
}

/// Complete a bare local-part (`alice`) with `default_domain`.
///
/// Anything that already contains `@` is returned unchanged.
#[must_use]
pub fn normalize_identifier(raw: &str, default_domain: &str) -> String {
    if raw.contains('@') {
        raw.to_string()
    } else {
        format!("{raw}@{default_domain}")
    }
}
