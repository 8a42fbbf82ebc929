//! The per-session working copy of the templates and its teardown.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use tempfile::{Builder, TempDir};

use lantern_utils::{copy_dir_recursive, list_file_names};

use crate::errors::SetupError;

/// Copy `source` into a fresh temporary directory.
///
/// Rendered `-copy.html` files are written there, never into `source`.
pub fn prepare_workspace(source: &Path) -> Result<TempDir, SetupError> {
    let dir = Builder::new()
        .prefix("lantern-setup-")
        .tempdir()
        .map_err(SetupError::Workspace)?;
    copy_dir_recursive(source, dir.path()).map_err(|source_err| SetupError::CopyTemplates {
        path: source.to_path_buf(),
        source: source_err,
    })?;
    match list_file_names(dir.path()) {
        Ok(files) => tracing::info!(
            dir = %dir.path().display(),
            ?files,
            "Prepared template working area"
        ),
        Err(e) => tracing::warn!(dir = %dir.path().display(), "Could not list working area: {e}"),
    }
    Ok(dir)
}

/// Session cleanup that runs at most once, whichever path triggers it first.
///
/// Shared between the flow, the close path and the signal hook.
#[derive(Debug, Default)]
pub struct Teardown {
    done: AtomicBool,
    workspace: Mutex<Option<TempDir>>,
}

impl Teardown {
    #[must_use]
    pub fn new(workspace: Option<TempDir>) -> Self {
        Self {
            done: AtomicBool::new(false),
            workspace: Mutex::new(workspace),
        }
    }

    /// Remove the working area. Returns `true` only for the call that did it.
    pub fn run(&self) -> bool {
        if self.done.swap(true, Ordering::SeqCst) {
            return false;
        }
        let workspace = self
            .workspace
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(dir) = workspace {
            let path = dir.path().to_path_buf();
            match dir.close() {
                Ok(()) => tracing::info!(dir = %path.display(), "Removed template working area"),
                Err(e) => tracing::warn!(dir = %path.display(), "Failed to remove working area: {e}"),
            }
        }
        true
    }

    #[must_use]
    pub fn has_run(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }
}
