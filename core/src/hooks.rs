//! Side effects of finishing the wizard.

use std::fs;
use std::path::{Path, PathBuf};

use lantern_utils::atomic_write;

use crate::errors::PersistenceError;

pub trait SetupHooks {
    /// Record that setup completed at least once.
    fn mark_installed(&mut self) -> Result<(), PersistenceError>;
    /// Apply the new settings to an existing installation.
    fn reconfigure(&mut self) -> Result<(), PersistenceError>;
}

/// Marker file written on completion. Reconfiguration rewrites it with the
/// `reconfigured` state.
#[derive(Debug, Clone)]
pub struct MarkerHooks {
    marker: PathBuf,
}

impl MarkerHooks {
    pub fn new(marker: impl Into<PathBuf>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    #[must_use]
    pub fn marker(&self) -> &Path {
        &self.marker
    }

    fn write_marker(&self, state: &str) -> Result<(), PersistenceError> {
        let write_err = |source| PersistenceError::Write {
            path: self.marker.clone(),
            source,
        };
        if let Some(parent) = self.marker.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        atomic_write(&self.marker, format!("{state}\n").as_bytes()).map_err(write_err)
    }
}

impl SetupHooks for MarkerHooks {
    fn mark_installed(&mut self) -> Result<(), PersistenceError> {
        self.write_marker("installed")?;
        tracing::info!(marker = %self.marker.display(), "Marked installation complete");
        Ok(())
    }

    fn reconfigure(&mut self) -> Result<(), PersistenceError> {
        self.write_marker("reconfigured")?;
        tracing::info!("Applied reconfiguration");
        Ok(())
    }
}
