//! Whether the user is treated as censored.
//!
//! Detection is external and read-only here. The user's explicit choice on the
//! start page is a separate "forced" flag that survives restarts.

use std::path::PathBuf;

use lantern_types::InstallMode;

use crate::errors::PersistenceError;

pub trait CensorshipMonitor {
    /// Externally detected censorship.
    fn is_censored(&self) -> bool;
    fn is_forced(&self) -> bool;
    /// Record an explicit censored choice. The in-memory flag changes even when
    /// persisting it fails.
    fn force_censored(&mut self) -> Result<(), PersistenceError>;
    fn unforce_censored(&mut self) -> Result<(), PersistenceError>;

    fn mode(&self) -> InstallMode {
        InstallMode::from_censored(self.is_censored() || self.is_forced())
    }
}

/// Detection result fixed at startup; the forced flag is written to the
/// `[censorship]` table of the config file.
#[derive(Debug, Clone)]
pub struct ConfigCensorship {
    detected: bool,
    forced: bool,
    config_path: Option<PathBuf>,
}

impl ConfigCensorship {
    #[must_use]
    pub fn new(detected: bool, forced: bool, config_path: Option<PathBuf>) -> Self {
        Self {
            detected,
            forced,
            config_path,
        }
    }

    fn set_forced(&mut self, forced: bool) -> Result<(), PersistenceError> {
        if self.forced == forced {
            return Ok(());
        }
        self.forced = forced;
        tracing::info!(forced, "Censorship choice changed");
        match &self.config_path {
            Some(path) => Ok(lantern_config::persist_forced_censorship(path, forced)?),
            None => Ok(()),
        }
    }
}

impl CensorshipMonitor for ConfigCensorship {
    fn is_censored(&self) -> bool {
        self.detected
    }

    fn is_forced(&self) -> bool {
        self.forced
    }

    fn force_censored(&mut self) -> Result<(), PersistenceError> {
        self.set_forced(true)
    }

    fn unforce_censored(&mut self) -> Result<(), PersistenceError> {
        self.set_forced(false)
    }
}
