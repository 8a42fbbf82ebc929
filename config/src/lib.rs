//! Configuration for the setup wizard.
//!
//! The raw TOML structs mirror `~/.lantern/config.toml` with every field
//! optional. [`SetupSettings::resolve`] applies defaults at the parse boundary
//! so the rest of the workspace never sees an `Option` for a setting.
//!
//! ```toml
//! [app]
//! reconfigure = false
//! data_dir = "~/.lantern"
//!
//! [templates]
//! source_dir = "srv"
//!
//! [directory]
//! default_domain = "gmail.com"
//! uncensored_attempts = 1
//! censored_attempts = 5
//! retry_delay_ms = 500
//! contacts_file = "contacts.json"
//!
//! [censorship]
//! detected = false
//! forced = false
//! ```

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lantern_utils::{AtomicWriteOptions, atomic_write_with_options};
use serde::Deserialize;
use thiserror::Error;
use toml_edit::{DocumentMut, Item, Table, TomlError};

pub const DEFAULT_DOMAIN: &str = "gmail.com";
pub const DEFAULT_TEMPLATE_DIR: &str = "srv";
pub const DEFAULT_UNCENSORED_ATTEMPTS: u32 = 1;
pub const DEFAULT_CENSORED_ATTEMPTS: u32 = 5;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;
const DEFAULT_CONTACTS_FILE: &str = "contacts.json";

#[derive(Debug, Default, Deserialize)]
pub struct SetupConfig {
    pub app: Option<AppConfig>,
    pub templates: Option<TemplatesConfig>,
    pub directory: Option<DirectoryConfig>,
    pub censorship: Option<CensorshipConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("could not determine config path")]
    NoPath,
    #[error("failed to update config at {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("config at {} is not valid TOML: {source}", path.display())]
    Edit {
        path: PathBuf,
        source: TomlError,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Write { path, .. }
            | ConfigError::Edit { path, .. } => Some(path),
            ConfigError::NoPath => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Start in reconfiguration mode (editing an existing setup).
    #[serde(default)]
    pub reconfigure: bool,
    /// Where trust set, credentials, and logs live. `~` and `${VAR}` expand.
    pub data_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TemplatesConfig {
    /// Directory holding the page templates. Copied to a private working
    /// area when the wizard starts.
    pub source_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DirectoryConfig {
    /// Domain appended to identifiers typed without one.
    pub default_domain: Option<String>,
    /// Lookup budgets. Values above the defaults are clamped down to them.
    pub uncensored_attempts: Option<u32>,
    pub censored_attempts: Option<u32>,
    /// Initial backoff between lookup attempts. Doubles per retry.
    pub retry_delay_ms: Option<u64>,
    /// Contacts file for the file-backed directory (relative to `data_dir`).
    pub contacts_file: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CensorshipConfig {
    /// Result of censorship detection for this machine.
    #[serde(default)]
    pub detected: bool,
    /// The user explicitly chose censored mode.
    #[serde(default)]
    pub forced: bool,
}

/// Fully resolved settings. Existence of a value is the proof of its validity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupSettings {
    pub reconfigure: bool,
    pub data_dir: PathBuf,
    pub template_dir: PathBuf,
    pub default_domain: String,
    pub uncensored_attempts: u32,
    pub censored_attempts: u32,
    pub retry_delay: Duration,
    pub contacts_file: PathBuf,
    pub censorship_detected: bool,
    pub censorship_forced: bool,
}

impl Default for SetupSettings {
    fn default() -> Self {
        Self::resolve(None)
    }
}

impl SetupSettings {
    #[must_use]
    pub fn resolve(config: Option<&SetupConfig>) -> Self {
        let app = config.and_then(|c| c.app.as_ref());
        let templates = config.and_then(|c| c.templates.as_ref());
        let directory = config.and_then(|c| c.directory.as_ref());
        let censorship = config.and_then(|c| c.censorship.as_ref());

        let data_dir = app
            .and_then(|a| a.data_dir.as_deref())
            .map(expand_path)
            .unwrap_or_else(default_data_dir);

        let template_dir = templates
            .and_then(|t| t.source_dir.as_deref())
            .map(expand_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATE_DIR));

        let default_domain = directory
            .and_then(|d| d.default_domain.as_deref())
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_DOMAIN)
            .to_string();

        let contacts_file = directory
            .and_then(|d| d.contacts_file.as_deref())
            .map(expand_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTACTS_FILE));
        let contacts_file = if contacts_file.is_absolute() {
            contacts_file
        } else {
            data_dir.join(contacts_file)
        };

        Self {
            reconfigure: app.is_some_and(|a| a.reconfigure),
            data_dir,
            template_dir,
            default_domain,
            // At least one attempt, never more than the fixed budget.
            uncensored_attempts: directory
                .and_then(|d| d.uncensored_attempts)
                .unwrap_or(DEFAULT_UNCENSORED_ATTEMPTS)
                .clamp(1, DEFAULT_UNCENSORED_ATTEMPTS),
            censored_attempts: directory
                .and_then(|d| d.censored_attempts)
                .unwrap_or(DEFAULT_CENSORED_ATTEMPTS)
                .clamp(1, DEFAULT_CENSORED_ATTEMPTS),
            retry_delay: Duration::from_millis(
                directory
                    .and_then(|d| d.retry_delay_ms)
                    .unwrap_or(DEFAULT_RETRY_DELAY_MS),
            ),
            contacts_file,
            censorship_detected: censorship.is_some_and(|c| c.detected),
            censorship_forced: censorship.is_some_and(|c| c.forced),
        }
    }

    #[must_use]
    pub fn trust_file(&self) -> PathBuf {
        self.data_dir.join("trusted.json")
    }

    #[must_use]
    pub fn credentials_file(&self) -> PathBuf {
        self.data_dir.join("credentials.json")
    }

    #[must_use]
    pub fn installed_marker(&self) -> PathBuf {
        self.data_dir.join("installed")
    }

    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("logs").join("setup.log")
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir().map_or_else(|| PathBuf::from(".lantern"), |home| home.join(".lantern"))
}

/// Expand `${VAR}` references (missing vars become empty) and a leading `~`.
#[must_use]
pub fn expand_path(value: &str) -> PathBuf {
    let expanded = expand_env_vars(value);
    if expanded == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = expanded.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(expanded)
}

#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                if !name.is_empty() {
                    out.push_str(&env::var(name).unwrap_or_default());
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

impl SetupConfig {
    /// Load from the default location. `Ok(None)` when there is no config file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|source| {
            tracing::warn!("Failed to read config at {}: {source}", path.display());
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        toml::from_str(&content).map(Some).map_err(|source| {
            tracing::warn!("Failed to parse config at {}: {source}", path.display());
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }
}

/// Persist the user's explicit censorship choice as `[censorship] forced`.
///
/// Uses `toml_edit` so comments and unrelated settings survive. Creates the
/// file and its parent directory if needed.
pub fn persist_forced_censorship(path: &Path, forced: bool) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let content = if path.exists() {
        fs::read_to_string(path).map_err(write_err)?
    } else {
        String::new()
    };

    let mut doc = content
        .parse::<DocumentMut>()
        .map_err(|source| ConfigError::Edit {
            path: path.to_path_buf(),
            source,
        })?;

    if !doc.contains_key("censorship") {
        doc["censorship"] = Item::Table(Table::new());
    }
    doc["censorship"]["forced"] = toml_edit::value(forced);

    atomic_write_with_options(
        path,
        doc.to_string().as_bytes(),
        AtomicWriteOptions::default(),
    )
    .map_err(write_err)?;

    tracing::info!(path = %path.display(), forced, "Persisted censorship choice");
    Ok(())
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".lantern").join("config.toml"))
}
