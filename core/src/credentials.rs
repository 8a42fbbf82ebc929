//! Saved sign-in for the contact directory.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::Serialize;

use lantern_utils::{AtomicWriteOptions, atomic_write_with_options};

use crate::errors::PersistenceError;

pub trait CredentialStore {
    fn write(&mut self, identifier: &str, secret: &str) -> Result<(), PersistenceError>;
    /// Forget anything saved. Clearing an empty store succeeds.
    fn clear(&mut self) -> Result<(), PersistenceError>;
}

#[derive(Serialize)]
struct SavedCredentials<'a> {
    identifier: &'a str,
    secret: &'a str,
}

/// JSON file readable by the owner only.
#[derive(Debug, Clone)]
pub struct FileCredentials {
    path: PathBuf,
}

impl FileCredentials {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialStore for FileCredentials {
    fn write(&mut self, identifier: &str, secret: &str) -> Result<(), PersistenceError> {
        let write_err = |source| PersistenceError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_vec(&SavedCredentials { identifier, secret }).map_err(
            |source| PersistenceError::Encode {
                what: "credentials",
                source,
            },
        )?;
        atomic_write_with_options(&self.path, &json, AtomicWriteOptions::sensitive())
            .map_err(write_err)?;
        tracing::debug!(identifier, "Saved directory credentials");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), PersistenceError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("Cleared saved credentials");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PersistenceError::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
