//! Keep the directory password out of core dumps.
//!
//! The sign-in secret lives in process memory while the wizard runs, so core
//! dumps are disabled unless `LANTERN_ALLOW_COREDUMPS` says otherwise.

use anyhow::{Context, Result};
use std::env;
#[cfg(unix)]
use std::io;

const ALLOW_COREDUMPS: &str = "LANTERN_ALLOW_COREDUMPS";

pub fn apply() -> Result<()> {
    if env::var(ALLOW_COREDUMPS).is_ok_and(|raw| is_truthy(&raw)) {
        tracing::warn!(
            env_var = ALLOW_COREDUMPS,
            "Core dump hardening disabled by environment override"
        );
        return Ok(());
    }

    disable_core_dumps().context("failed to disable core dumps")?;
    tracing::info!("Core dumps disabled");
    Ok(())
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

#[cfg(unix)]
fn disable_core_dumps() -> Result<()> {
    let limit = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    // SAFETY: `limit` is a valid, initialized rlimit for the duration of the call.
    if unsafe { libc::setrlimit(libc::RLIMIT_CORE, &raw const limit) } != 0 {
        return Err(io::Error::last_os_error()).context("setrlimit(RLIMIT_CORE=0)");
    }

    #[cfg(target_os = "linux")]
    {
        // SAFETY: PR_SET_DUMPABLE takes plain integer arguments.
        if unsafe { libc::prctl(libc::PR_SET_DUMPABLE, 0, 0, 0, 0) } != 0 {
            return Err(io::Error::last_os_error()).context("prctl(PR_SET_DUMPABLE=0)");
        }
    }

    Ok(())
}

#[cfg(not(unix))]
fn disable_core_dumps() -> Result<()> {
    Ok(())
}
