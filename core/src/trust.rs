//! Trusted-contacts store: the [`TrustSet`] plus where it is kept.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use lantern_types::TrustSet;
use lantern_utils::{AtomicWriteOptions, atomic_write_with_options, recover_bak_file};

use crate::errors::PersistenceError;

/// Backing storage for the trust set.
pub trait TrustPersistence {
    fn load(&self) -> Result<TrustSet, PersistenceError>;
    fn save(&self, set: &TrustSet) -> Result<(), PersistenceError>;
}

/// JSON array of identifiers on disk.
#[derive(Debug, Clone)]
pub struct JsonTrustFile {
    path: PathBuf,
}

impl JsonTrustFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TrustPersistence for JsonTrustFile {
    fn load(&self) -> Result<TrustSet, PersistenceError> {
        recover_bak_file(&self.path);
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(TrustSet::new()),
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_slice(&bytes).map_err(|source| PersistenceError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, set: &TrustSet) -> Result<(), PersistenceError> {
        let write_err = |source| PersistenceError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_vec_pretty(set).map_err(|source| PersistenceError::Encode {
            what: "trusted contacts",
            source,
        })?;
        atomic_write_with_options(&self.path, &json, AtomicWriteOptions::default())
            .map_err(write_err)
    }
}

/// Add-only store of trusted identifiers.
///
/// The in-memory set is authoritative for the session. Each mutation that adds
/// at least one identifier is flushed to the backing storage, if any.
pub struct TrustStore {
    set: TrustSet,
    backing: Option<Box<dyn TrustPersistence>>,
}

impl TrustStore {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            set: TrustSet::new(),
            backing: None,
        }
    }

    /// Load the persisted set. A load failure is logged and the session starts
    /// from an empty set.
    #[must_use]
    pub fn open(backing: Box<dyn TrustPersistence>) -> Self {
        let set = backing.load().unwrap_or_else(|e| {
            tracing::warn!("Trusted contacts unavailable, starting empty: {e}");
            TrustSet::new()
        });
        tracing::debug!(count = set.len(), "Loaded trusted contacts");
        Self {
            set,
            backing: Some(backing),
        }
    }

    #[must_use]
    pub fn is_trusted(&self, identifier: &str) -> bool {
        self.set.contains(identifier)
    }

    /// Union `identifiers` into the set and flush.
    ///
    /// Returns how many identifiers were new. The in-memory set is updated even
    /// when the flush fails.
    pub fn add_all<I, S>(&mut self, identifiers: I) -> Result<usize, PersistenceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let added = self.set.extend(identifiers);
        if added > 0
            && let Some(backing) = &self.backing
        {
            backing.save(&self.set)?;
        }
        Ok(added)
    }

    #[must_use]
    pub fn snapshot(&self) -> &TrustSet {
        &self.set
    }
}

impl Default for TrustStore {
    fn default() -> Self {
        Self::in_memory()
    }
}
