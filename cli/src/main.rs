//! Lantern setup - binary entry point.
//!
//! Resolves settings, builds the wizard over its concrete collaborators and
//! hands it to the line-oriented host in [`host`]. A presentation layer (or a
//! person at a terminal) feeds navigation locations on stdin and acts on the
//! `display`/`closed`/`exit` lines printed to stdout.
//!
//! ```text
//! main() -> init_tracing() -> settings -> Wizard::prepare() -> host::run()
//!                                  |                                |
//!                                  v                                v
//!                    --update: prepare_update_prompt()     exit code / teardown
//! ```
//!
//! Logs never go to stdout; that stream belongs to the host protocol.

mod crash_hardening;
mod host;

use anyhow::{Context, Result};
use clap::Parser;
use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::PathBuf,
    process::{self, ExitCode},
    sync::{Arc, Mutex},
};
use tokio::{
    runtime::{Builder, Runtime},
    signal,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use lantern_config::{SetupConfig, SetupSettings};
use lantern_core::{
    ConfigCensorship, English, FileCredentials, JsonDirectory, JsonTrustFile, MarkerHooks,
    RetryPolicy, Teardown, Wizard, WizardOptions, WizardParts, prepare_update_prompt,
    update_details,
};

/// Exit status used when the process is interrupted.
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Debug, Parser)]
#[command(name = "lantern-setup", version, about = "Lantern install and reconfiguration wizard")]
struct Cli {
    /// Run as a reconfiguration of an existing install.
    #[arg(long)]
    reconfigure: bool,

    /// Config file to read instead of ~/.lantern/config.toml.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory holding the HTML templates.
    #[arg(long, value_name = "DIR")]
    templates: Option<PathBuf>,

    /// Show the update prompt instead of the wizard, filled from KEY=VALUE details.
    #[arg(long, value_name = "KEY=VALUE", num_args = 0..)]
    update: Option<Vec<String>>,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_setup_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file means no logs; stdout carries the host protocol.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_setup_log_file() -> (Option<(PathBuf, File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in setup_log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn setup_log_file_candidates() -> Vec<PathBuf> {
    vec![
        // Primary: ~/.lantern/logs/setup.log
        SetupSettings::default().log_file(),
        // Fallback: ./.lantern/logs/setup.log
        PathBuf::from(".lantern").join("logs").join("setup.log"),
    ]
}

fn load_settings(cli: &Cli) -> (SetupSettings, Option<PathBuf>) {
    let config_path = cli.config.clone().or_else(SetupConfig::path);
    let config = match config_path.as_deref() {
        Some(path) => SetupConfig::load_from(path),
        None => Ok(None),
    };
    let config = config.unwrap_or_else(|e| {
        tracing::warn!("Ignoring config: {e}");
        None
    });

    let mut settings = SetupSettings::resolve(config.as_ref());
    if cli.reconfigure {
        settings.reconfigure = true;
    }
    if let Some(dir) = &cli.templates {
        settings.template_dir.clone_from(dir);
    }
    tracing::info!(
        template_dir = %settings.template_dir.display(),
        data_dir = %settings.data_dir.display(),
        reconfigure = settings.reconfigure,
        censored = settings.censorship_detected,
        forced = settings.censorship_forced,
        "Resolved settings"
    );
    (settings, config_path)
}

fn wizard_parts(settings: &SetupSettings, config_path: Option<PathBuf>) -> WizardParts {
    WizardParts {
        directory: Box::new(JsonDirectory::new(
            settings.contacts_file.clone(),
            RetryPolicy::new(settings.retry_delay),
        )),
        censorship: Box::new(ConfigCensorship::new(
            settings.censorship_detected,
            settings.censorship_forced,
            config_path,
        )),
        credentials: Box::new(FileCredentials::new(settings.credentials_file())),
        hooks: Box::new(MarkerHooks::new(settings.installed_marker())),
        trust: Some(Box::new(JsonTrustFile::new(settings.trust_file()))),
        translator: Box::new(English),
    }
}

/// Run the teardown and exit when the process is interrupted.
fn install_interrupt_handler(runtime: &Runtime, teardown: Arc<Teardown>) {
    runtime.spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupted; removing working area");
                teardown.run();
                process::exit(INTERRUPTED_EXIT_CODE);
            }
            Err(e) => tracing::warn!("Failed to listen for interrupts: {e}"),
        }
    });
}

fn exit_code(code: i32) -> ExitCode {
    u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = crash_hardening::apply() {
        tracing::warn!("Crash hardening failed: {e:#}");
    }

    let (settings, config_path) = load_settings(&cli);

    let runtime = Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .context("failed to start signal runtime")?;

    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();

    let code = if let Some(pairs) = &cli.update {
        let mut prompt = prepare_update_prompt(&settings.template_dir, Box::new(English))
            .context("failed to prepare the update prompt")?;
        install_interrupt_handler(&runtime, prompt.session().teardown());
        let first = prompt.show(update_details(pairs));
        host::run(&mut prompt, first, stdin, &mut stdout)?
    } else {
        let options = WizardOptions::from_settings(&settings);
        let mut wizard = Wizard::prepare(&options, wizard_parts(&settings, config_path))
            .context("failed to prepare the setup wizard")?;
        install_interrupt_handler(&runtime, wizard.teardown());
        let first = wizard.start();
        host::run(&mut wizard, first, stdin, &mut stdout)?
    };

    stdout.flush()?;
    tracing::info!(code, "Setup finished");
    Ok(exit_code(code))
}
