//! Wires the flow, the session and the template working area together.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lantern_config::SetupSettings;
use lantern_types::{InstallMode, TemplateVariables};

use crate::catalog::{Catalog, Translator};
use crate::censorship::CensorshipMonitor;
use crate::credentials::CredentialStore;
use crate::directory::ContactDirectory;
use crate::errors::SetupError;
use crate::flow::{FlowContext, FlowParts, InstallFlow, LookupSettings};
use crate::hooks::SetupHooks;
use crate::session::{CloseIntent, HostAction, Session};
use crate::template::{DirTemplateStore, TemplateRenderer, TemplateStore};
use crate::trust::{TrustPersistence, TrustStore};
use crate::update::UpdatePrompt;
use crate::workspace::{Teardown, prepare_workspace};

/// Pluggable collaborators.
pub struct WizardParts {
    pub directory: Box<dyn ContactDirectory>,
    pub censorship: Box<dyn CensorshipMonitor>,
    pub credentials: Box<dyn CredentialStore>,
    pub hooks: Box<dyn SetupHooks>,
    /// `None` keeps the trust set in memory only.
    pub trust: Option<Box<dyn TrustPersistence>>,
    pub translator: Box<dyn Translator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardOptions {
    pub template_dir: PathBuf,
    pub reconfigure: bool,
    pub lookup: LookupSettings,
}

impl WizardOptions {
    #[must_use]
    pub fn from_settings(settings: &SetupSettings) -> Self {
        Self {
            template_dir: settings.template_dir.clone(),
            reconfigure: settings.reconfigure,
            lookup: LookupSettings {
                default_domain: settings.default_domain.clone(),
                uncensored_attempts: settings.uncensored_attempts,
                censored_attempts: settings.censored_attempts,
            },
        }
    }
}

/// Copy the templates into a fresh working area.
fn working_store(template_dir: &Path) -> Result<(DirTemplateStore, Arc<Teardown>), SetupError> {
    let workspace = prepare_workspace(template_dir)?;
    let store = DirTemplateStore::new(workspace.path());
    Ok((store, Arc::new(Teardown::new(Some(workspace)))))
}

/// The install/reconfigure wizard as seen by a presentation host.
pub struct Wizard {
    flow: InstallFlow,
    session: Session,
}

impl Wizard {
    /// Prepare the working area and build the wizard. Fails only when the
    /// templates cannot be copied.
    pub fn prepare(options: &WizardOptions, parts: WizardParts) -> Result<Self, SetupError> {
        let (store, teardown) = working_store(&options.template_dir)?;
        Ok(Self::with_store(Box::new(store), teardown, options, parts))
    }

    /// Build over an existing template store.
    #[must_use]
    pub fn with_store(
        store: Box<dyn TemplateStore>,
        teardown: Arc<Teardown>,
        options: &WizardOptions,
        parts: WizardParts,
    ) -> Self {
        let WizardParts {
            directory,
            censorship,
            credentials,
            hooks,
            trust,
            translator,
        } = parts;
        let catalog = Catalog::new(translator);
        let renderer = TemplateRenderer::new(store, catalog.installation_title());
        let trust = trust.map_or_else(TrustStore::in_memory, TrustStore::open);
        let mode = censorship.mode();
        let flow = InstallFlow::new(FlowParts {
            renderer,
            catalog,
            trust,
            directory,
            censorship,
            credentials,
            hooks,
            lookup: options.lookup.clone(),
        });
        let session = Session::new(FlowContext::new(mode, options.reconfigure), teardown);
        Self { flow, session }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn flow(&self) -> &InstallFlow {
        &self.flow
    }

    #[must_use]
    pub fn teardown(&self) -> Arc<Teardown> {
        self.session.teardown()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.session.is_closed()
    }

    pub fn start(&mut self) -> HostAction {
        let transition = self.flow.start(self.session.context_mut());
        self.session.apply(transition)
    }

    pub fn navigate(&mut self, location: &str) -> HostAction {
        let transition = self.flow.handle(self.session.context_mut(), location);
        self.session.apply(transition)
    }

    /// The window is being closed. `confirm` receives the title and the
    /// question. A confirmed cancel forgets saved credentials, then exits.
    pub fn close_requested(&mut self, confirm: impl FnOnce(&str, &str) -> bool) -> CloseIntent {
        let catalog = self.flow.catalog();
        let title = catalog.exit_title();
        let message = catalog.cancel_prompt(self.session.is_reconfiguration());
        let flow = &mut self.flow;
        self.session.close_intent(
            || confirm(&title, &message),
            || flow.forget_credentials(),
        )
    }
}

/// Build the update prompt over a fresh working area.
pub fn prepare_update_prompt(
    template_dir: &Path,
    translator: Box<dyn Translator>,
) -> Result<UpdatePrompt, SetupError> {
    let (store, teardown) = working_store(template_dir)?;
    let catalog = Catalog::new(translator);
    let renderer = TemplateRenderer::new(Box::new(store), catalog.installation_title());
    let session = Session::new(FlowContext::new(InstallMode::default(), false), teardown);
    Ok(UpdatePrompt::new(renderer, catalog, session))
}

/// Parse `key=value` pairs into update details. Pairs without `=` are skipped.
pub fn update_details<I, S>(pairs: I) -> TemplateVariables
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    pairs
        .into_iter()
        .filter_map(|pair| {
            pair.as_ref()
                .split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
        })
        .collect()
}
