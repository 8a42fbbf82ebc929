//! Shared infrastructure utilities for the setup wizard.
//!
//! This crate provides cross-cutting utilities that multiple crates need
//! but that don't belong in the domain-pure `lantern-types` crate:
//!
//! - **`atomic_write`**: Crash-safe file persistence (temp + rename)
//! - **`fs`**: Recursive directory copy and directory listing

pub mod atomic_write;
pub mod fs;

pub use atomic_write::{
    AtomicWriteOptions, FileSyncPolicy, PersistMode, atomic_write, atomic_write_with_options,
    recover_bak_file,
};
pub use fs::{copy_dir_recursive, list_file_names};
