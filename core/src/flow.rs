//! The navigation state machine.
//!
//! The host reports every location the presentation surface tries to load.
//! [`InstallFlow::handle`] classifies it, runs the side effects for that step
//! and answers with a [`Transition`] for the host to apply.

use lantern_types::{ContactEntry, InstallMode, TemplateVariables, normalize_identifier};

use crate::catalog::Catalog;
use crate::censorship::CensorshipMonitor;
use crate::contacts::contacts_fragment;
use crate::credentials::CredentialStore;
use crate::directory::ContactDirectory;
use crate::errors::DirectoryError;
use crate::event::{FinishChoice, FlowEvent, LoginForm, classify};
use crate::hooks::SetupHooks;
use crate::template::{RenderedDocument, TemplateRenderer};
use crate::trust::TrustStore;

/// Where the user is in the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowState {
    #[default]
    Start,
    /// Start page shown; waiting for the censored/uncensored choice.
    ModeChoice,
    LoginForm(InstallMode),
    TrustSelection,
    Finishing,
    Closed,
}

/// Mutable per-session data threaded through every [`InstallFlow::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowContext {
    pub mode: InstallMode,
    pub is_reconfiguration: bool,
    /// The last location handled; an identical follow-up is ignored.
    pub last_location: String,
    pub closed: bool,
    pub state: FlowState,
}

impl FlowContext {
    #[must_use]
    pub fn new(mode: InstallMode, is_reconfiguration: bool) -> Self {
        Self {
            mode,
            is_reconfiguration,
            last_location: String::new(),
            closed: false,
            state: FlowState::Start,
        }
    }
}

/// What the host should do after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Render(RenderedDocument),
    Stay,
    /// Close the presentation surface; the application keeps running.
    Close,
    /// Close and stop the application.
    Terminate,
}

/// Identifier completion and attempt budgets for sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupSettings {
    pub default_domain: String,
    pub uncensored_attempts: u32,
    pub censored_attempts: u32,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            default_domain: lantern_config::DEFAULT_DOMAIN.to_string(),
            uncensored_attempts: lantern_config::DEFAULT_UNCENSORED_ATTEMPTS,
            censored_attempts: lantern_config::DEFAULT_CENSORED_ATTEMPTS,
        }
    }
}

impl LookupSettings {
    /// Budget for one lookup, clamped to the fixed per-mode limit.
    #[must_use]
    pub fn attempts(&self, mode: InstallMode) -> u32 {
        match mode {
            InstallMode::Censored => self
                .censored_attempts
                .clamp(1, lantern_config::DEFAULT_CENSORED_ATTEMPTS),
            InstallMode::Uncensored => self
                .uncensored_attempts
                .clamp(1, lantern_config::DEFAULT_UNCENSORED_ATTEMPTS),
        }
    }
}

/// Everything the flow talks to.
pub struct FlowParts {
    pub renderer: TemplateRenderer,
    pub catalog: Catalog,
    pub trust: TrustStore,
    pub directory: Box<dyn ContactDirectory>,
    pub censorship: Box<dyn CensorshipMonitor>,
    pub credentials: Box<dyn CredentialStore>,
    pub hooks: Box<dyn SetupHooks>,
    pub lookup: LookupSettings,
}

pub struct InstallFlow {
    renderer: TemplateRenderer,
    catalog: Catalog,
    trust: TrustStore,
    directory: Box<dyn ContactDirectory>,
    censorship: Box<dyn CensorshipMonitor>,
    credentials: Box<dyn CredentialStore>,
    hooks: Box<dyn SetupHooks>,
    lookup: LookupSettings,
}

impl InstallFlow {
    #[must_use]
    pub fn new(parts: FlowParts) -> Self {
        let FlowParts {
            renderer,
            catalog,
            trust,
            directory,
            censorship,
            credentials,
            hooks,
            lookup,
        } = parts;
        Self {
            renderer,
            catalog,
            trust,
            directory,
            censorship,
            credentials,
            hooks,
            lookup,
        }
    }

    #[must_use]
    pub fn trust(&self) -> &TrustStore {
        &self.trust
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Censorship mode as currently known.
    #[must_use]
    pub fn mode(&self) -> InstallMode {
        self.censorship.mode()
    }

    /// Render the start page for the current censorship mode.
    pub fn start(&mut self, ctx: &mut FlowContext) -> Transition {
        let mode = self.censorship.mode();
        ctx.mode = mode;
        let template = format!("install0{}.html", mode.page_suffix());
        tracing::info!(%mode, reconfigure = ctx.is_reconfiguration, "Starting setup");
        self.show(ctx, FlowState::ModeChoice, &template, self.catalog.start(mode))
    }

    /// Handle one navigation event.
    pub fn handle(&mut self, ctx: &mut FlowContext, location: &str) -> Transition {
        if location == ctx.last_location {
            tracing::trace!(location, "Ignoring repeated location");
            return Transition::Stay;
        }
        ctx.last_location = location.to_string();
        tracing::info!(location, "Got location");

        if ctx.closed {
            tracing::debug!(location, "Setup already closed; ignoring");
            return Transition::Stay;
        }

        let event = match classify(location) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(location, "Ignoring location: {e}");
                return Transition::Stay;
            }
        };

        match event {
            FlowEvent::ServedCopy => Transition::Stay,
            FlowEvent::ChooseMode(mode) => self.choose_mode(ctx, mode),
            FlowEvent::TrustedContacts { selected } => self.approve_contacts(ctx, &selected),
            FlowEvent::Login { mode, form } => self.login(ctx, mode, &form),
            FlowEvent::Finished(choice) => self.finish(ctx, choice),
            FlowEvent::Page { name } => {
                let state = ctx.state;
                self.show(ctx, state, &name, self.catalog.welcome())
            }
        }
    }

    /// Drop saved credentials after the user abandons setup.
    pub fn forget_credentials(&mut self) {
        if let Err(e) = self.credentials.clear() {
            tracing::warn!("Failed to clear credentials: {e}");
        }
    }

    fn choose_mode(&mut self, ctx: &mut FlowContext, mode: InstallMode) -> Transition {
        // Detected censorship cannot be overridden; only the explicit choice is recorded.
        if !self.censorship.is_censored() {
            let recorded = match mode {
                InstallMode::Censored => self.censorship.force_censored(),
                InstallMode::Uncensored => self.censorship.unforce_censored(),
            };
            if let Err(e) = recorded {
                tracing::warn!(%mode, "Failed to persist censorship choice: {e}");
            }
        }
        ctx.mode = mode;
        let template = login_template(mode);
        self.show(ctx, FlowState::LoginForm(mode), &template, self.catalog.login_page(mode))
    }

    fn approve_contacts(&mut self, ctx: &mut FlowContext, selected: &[String]) -> Transition {
        match self.trust.add_all(selected) {
            Ok(added) => tracing::info!(selected = selected.len(), added, "Trusted contacts"),
            Err(e) => tracing::warn!("Failed to save trusted contacts: {e}"),
        }
        self.show(
            ctx,
            FlowState::Finishing,
            "installFinishedCensored.html",
            self.catalog.finished_censored(),
        )
    }

    fn login(&mut self, ctx: &mut FlowContext, mode: InstallMode, form: &LoginForm) -> Transition {
        match self.lookup_contacts(mode, form) {
            Ok(_) if mode == InstallMode::Uncensored => self.show(
                ctx,
                FlowState::Finishing,
                "installFinishedUncensored.html",
                self.catalog.finished_uncensored(),
            ),
            Ok(entries) => {
                let rows = contacts_fragment(&entries, &self.trust);
                self.show(
                    ctx,
                    FlowState::TrustSelection,
                    "install2Censored.html",
                    self.catalog.trust_selection(rows),
                )
            }
            Err(e) => {
                tracing::warn!(%mode, "Error accessing contacts: {e}");
                let template = login_template(mode);
                self.show(
                    ctx,
                    FlowState::LoginForm(mode),
                    &template,
                    self.catalog.login_failed(mode),
                )
            }
        }
    }

    fn lookup_contacts(
        &mut self,
        mode: InstallMode,
        form: &LoginForm,
    ) -> Result<Vec<ContactEntry>, DirectoryError> {
        let email = form.email.as_deref().unwrap_or_default();
        if email.trim().is_empty() {
            return Err(DirectoryError::MissingIdentifier);
        }
        if form.password.trim().is_empty() {
            return Err(DirectoryError::MissingCredential);
        }
        let identifier = normalize_identifier(email, &self.lookup.default_domain);
        let attempts = self.lookup.attempts(mode);
        tracing::info!(%identifier, attempts, "Fetching contacts");
        let entries = self
            .directory
            .fetch_contacts(&identifier, &form.password, attempts)?;
        if let Err(e) = self.credentials.write(&identifier, &form.password) {
            tracing::warn!("Failed to save credentials: {e}");
        }
        Ok(entries)
    }

    fn finish(&mut self, ctx: &mut FlowContext, choice: FinishChoice) -> Transition {
        if ctx.is_reconfiguration
            && let Err(e) = self.hooks.reconfigure()
        {
            tracing::warn!("Reconfiguration failed: {e}");
        }
        if let Err(e) = self.hooks.mark_installed() {
            tracing::warn!("Failed to mark installation complete: {e}");
        }
        ctx.state = FlowState::Closed;
        tracing::info!(?choice, "Setup finished");
        match choice {
            FinishChoice::KeepRunning => Transition::Close,
            FinishChoice::Terminate => Transition::Terminate,
        }
    }

    fn show(
        &self,
        ctx: &mut FlowContext,
        next: FlowState,
        template: &str,
        vars: TemplateVariables,
    ) -> Transition {
        match self.renderer.render(template, vars) {
            Ok(doc) => {
                ctx.state = next;
                Transition::Render(doc)
            }
            Err(e) => {
                tracing::error!(template, "Failed to render page: {e}");
                Transition::Stay
            }
        }
    }
}

fn login_template(mode: InstallMode) -> String {
    format!("install1{}.html", mode.page_suffix())
}
