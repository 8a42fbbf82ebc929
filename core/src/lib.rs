//! Domain logic for the Lantern setup wizard.
//!
//! The wizard is a small state machine driven by navigation events from a
//! presentation host. Every outside concern (contact lookup, censorship
//! detection, persistence, copy) sits behind a trait so hosts and tests can
//! swap it.

pub mod catalog;
pub mod censorship;
mod contacts;
pub mod credentials;
pub mod directory;
pub mod errors;
pub mod event;
pub mod flow;
pub mod hooks;
pub mod session;
pub mod template;
pub mod trust;
pub mod update;
mod wizard;
pub mod workspace;

pub use catalog::{Catalog, English, Translator};
pub use censorship::{CensorshipMonitor, ConfigCensorship};
pub use contacts::contacts_fragment;
pub use credentials::{CredentialStore, FileCredentials};
pub use directory::{ContactDirectory, JsonDirectory, RetryPolicy, secret_digest};
pub use errors::{DirectoryError, ParseError, PersistenceError, RenderError, SetupError};
pub use event::{FinishChoice, FlowEvent, LoginForm, classify};
pub use flow::{FlowContext, FlowParts, FlowState, InstallFlow, LookupSettings, Transition};
pub use hooks::{MarkerHooks, SetupHooks};
pub use session::{CloseIntent, ExitDecision, FORCED_EXIT_CODE, HostAction, Session};
pub use template::{
    DirTemplateStore, DocumentHandle, MemoryTemplateStore, RenderedDocument, TemplateRenderer,
    TemplateStore, output_name, substitute,
};
pub use trust::{JsonTrustFile, TrustPersistence, TrustStore};
pub use update::{UpdateEvent, UpdatePrompt, classify_update};
pub use wizard::{Wizard, WizardOptions, WizardParts, prepare_update_prompt, update_details};
pub use workspace::{Teardown, prepare_workspace};
