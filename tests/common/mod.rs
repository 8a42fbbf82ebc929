//! Shared test utilities and fixtures
//!
//! Recording fakes for the wizard's collaborators and a minimal set of page
//! templates.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use lantern_core::{
    CensorshipMonitor, ContactDirectory, CredentialStore, DirectoryError, DocumentHandle, English,
    LookupSettings, PersistenceError, RenderError, SetupHooks, Teardown, TemplateStore,
    TrustPersistence, Wizard, WizardOptions, WizardParts, secret_digest,
};
use lantern_types::{ContactEntry, TrustSet};

/// Page templates keyed by file name. Every page shows the tokens the tests
/// look for.
pub const PAGES: &[(&str, &str)] = &[
    (
        "install0Uncensored.html",
        "<title>installation_title</title><h1>title_string</h1><p>body_string</p>\
         <a href='install1Uncensored.html'>yes_provide_access</a>\
         <a href='install1Censored.html'>no_need_access</a>",
    ),
    (
        "install0Censored.html",
        "<title>installation_title</title><h1>title_string</h1><p>body_string</p>\
         <a href='install1Censored.html'>yes_need_access</a>\
         <a href='install1Uncensored.html'>no_provide_access</a>",
    ),
    (
        "install1Uncensored.html",
        "<p class='error'>error_message</p><p>body_string</p>\
         <form action='loginUncensored'>gmail_user_name gmail_password</form>",
    ),
    (
        "install1Censored.html",
        "<p class='error'>error_message</p><p>body_string</p>\
         <form action='loginCensored'>gmail_user_name gmail_password show_contacts</form>",
    ),
    (
        "install2Censored.html",
        "<p>text_body</p><form action='trustedContacts'>contacts_div approve</form>",
    ),
    (
        "installFinishedUncensored.html",
        "<p>body_string</p><form action='finished'>run_now finish_string</form>",
    ),
    (
        "installFinishedCensored.html",
        "<p>text_body</p><form action='finished'>run_now finish_string</form>",
    ),
    ("update.html", "<p>Lantern version is ready</p><a href='noUpdate'>later</a>"),
];

pub fn write_templates(dir: &Path) {
    fs::create_dir_all(dir).expect("template dir");
    for (name, body) in PAGES {
        fs::write(dir.join(name), body).expect("write template");
    }
}

/// Write a directory export with one account.
pub fn write_directory(path: &Path, identifier: &str, password: &str, contacts: &[(&str, &str)]) {
    let contacts: Vec<_> = contacts
        .iter()
        .map(|(id, name)| serde_json::json!({ "id": id, "name": name }))
        .collect();
    let mut accounts = serde_json::Map::new();
    accounts.insert(
        identifier.to_string(),
        serde_json::json!({
            "secret_sha256": secret_digest(password),
            "contacts": contacts,
        }),
    );
    let body = serde_json::json!({ "accounts": accounts });
    fs::write(path, serde_json::to_vec_pretty(&body).expect("encode")).expect("write directory");
}

/// Everything the fakes saw.
#[derive(Debug, Default)]
pub struct Record {
    /// (identifier, credential, max_attempts)
    pub lookups: Vec<(String, String, u32)>,
    pub forced: u32,
    pub unforced: u32,
    pub saved_credentials: Vec<(String, String)>,
    pub cleared_credentials: u32,
    pub installed: u32,
    pub reconfigured: u32,
    pub trust_saves: Vec<Vec<String>>,
    /// Rendered pages by output name.
    pub pages: HashMap<String, String>,
}

pub type Shared = Rc<RefCell<Record>>;

pub struct FakeDirectory {
    record: Shared,
    password: String,
    contacts: Vec<ContactEntry>,
}

impl ContactDirectory for FakeDirectory {
    fn fetch_contacts(
        &self,
        identifier: &str,
        credential: &str,
        max_attempts: u32,
    ) -> Result<Vec<ContactEntry>, DirectoryError> {
        self.record.borrow_mut().lookups.push((
            identifier.to_string(),
            credential.to_string(),
            max_attempts,
        ));
        if credential == self.password {
            Ok(self.contacts.clone())
        } else {
            Err(DirectoryError::Rejected {
                identifier: identifier.to_string(),
            })
        }
    }
}

pub struct FakeCensorship {
    record: Shared,
    detected: bool,
    forced: bool,
}

impl CensorshipMonitor for FakeCensorship {
    fn is_censored(&self) -> bool {
        self.detected
    }

    fn is_forced(&self) -> bool {
        self.forced
    }

    fn force_censored(&mut self) -> Result<(), PersistenceError> {
        self.record.borrow_mut().forced += 1;
        self.forced = true;
        Ok(())
    }

    fn unforce_censored(&mut self) -> Result<(), PersistenceError> {
        self.record.borrow_mut().unforced += 1;
        self.forced = false;
        Ok(())
    }
}

pub struct FakeCredentials(Shared);

impl CredentialStore for FakeCredentials {
    fn write(&mut self, identifier: &str, secret: &str) -> Result<(), PersistenceError> {
        self.0
            .borrow_mut()
            .saved_credentials
            .push((identifier.to_string(), secret.to_string()));
        Ok(())
    }

    fn clear(&mut self) -> Result<(), PersistenceError> {
        let mut record = self.0.borrow_mut();
        record.cleared_credentials += 1;
        record.saved_credentials.clear();
        Ok(())
    }
}

pub struct FakeHooks(Shared);

impl SetupHooks for FakeHooks {
    fn mark_installed(&mut self) -> Result<(), PersistenceError> {
        self.0.borrow_mut().installed += 1;
        Ok(())
    }

    fn reconfigure(&mut self) -> Result<(), PersistenceError> {
        self.0.borrow_mut().reconfigured += 1;
        Ok(())
    }
}

/// Trust persistence that starts from `initial` and records every save.
pub struct FakeTrust {
    record: Shared,
    initial: Vec<String>,
}

impl TrustPersistence for FakeTrust {
    fn load(&self) -> Result<TrustSet, PersistenceError> {
        let mut set = TrustSet::new();
        set.extend(&self.initial);
        Ok(set)
    }

    fn save(&self, set: &TrustSet) -> Result<(), PersistenceError> {
        self.record
            .borrow_mut()
            .trust_saves
            .push(set.iter().map(str::to_string).collect());
        Ok(())
    }
}

/// In-memory templates whose rendered copies land in the shared record.
pub struct RecordingTemplates {
    record: Shared,
    templates: HashMap<String, String>,
}

impl RecordingTemplates {
    pub fn new(record: Shared) -> Self {
        Self {
            record,
            templates: PAGES
                .iter()
                .map(|(name, body)| ((*name).to_string(), (*body).to_string()))
                .collect(),
        }
    }
}

impl TemplateStore for RecordingTemplates {
    fn load(&self, name: &str) -> Result<String, RenderError> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| RenderError::NotFound {
                name: name.to_string(),
            })
    }

    fn store(&self, output_name: &str, body: &str) -> Result<DocumentHandle, RenderError> {
        self.record
            .borrow_mut()
            .pages
            .insert(output_name.to_string(), body.to_string());
        Ok(DocumentHandle::new(format!("memory:{output_name}")))
    }
}

/// Knobs for [`fake_wizard`].
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    pub detected: bool,
    pub forced: bool,
    pub reconfigure: bool,
    /// Password the fake directory accepts.
    pub password: String,
    pub contacts: Vec<(String, String)>,
    pub trusted: Vec<String>,
    /// Sign-in settings; the stock ones when unset.
    pub lookup: Option<LookupSettings>,
}

impl Scenario {
    pub fn new(password: &str) -> Self {
        Self {
            password: password.to_string(),
            ..Self::default()
        }
    }

    pub fn contact(mut self, identifier: &str, name: &str) -> Self {
        self.contacts
            .push((identifier.to_string(), name.to_string()));
        self
    }
}

/// A wizard over recording fakes. Returns the shared record.
pub fn fake_wizard(scenario: Scenario) -> (Wizard, Shared) {
    let record = Shared::default();
    let parts = WizardParts {
        directory: Box::new(FakeDirectory {
            record: Rc::clone(&record),
            password: scenario.password,
            contacts: scenario
                .contacts
                .iter()
                .map(|(id, name)| ContactEntry::new(id.as_str(), name.as_str()))
                .collect(),
        }),
        censorship: Box::new(FakeCensorship {
            record: Rc::clone(&record),
            detected: scenario.detected,
            forced: scenario.forced,
        }),
        credentials: Box::new(FakeCredentials(Rc::clone(&record))),
        hooks: Box::new(FakeHooks(Rc::clone(&record))),
        trust: Some(Box::new(FakeTrust {
            record: Rc::clone(&record),
            initial: scenario.trusted,
        })),
        translator: Box::new(English),
    };
    let options = WizardOptions {
        template_dir: "unused".into(),
        reconfigure: scenario.reconfigure,
        lookup: scenario.lookup.unwrap_or_default(),
    };
    let wizard = Wizard::with_store(
        Box::new(RecordingTemplates::new(Rc::clone(&record))),
        Arc::new(Teardown::new(None)),
        &options,
        parts,
    );
    (wizard, record)
}

/// The last rendered copy of `template`.
pub fn page(record: &Shared, template: &str) -> String {
    let output = lantern_core::output_name(template);
    record
        .borrow()
        .pages
        .get(&output)
        .cloned()
        .unwrap_or_else(|| panic!("{output} was never rendered"))
}
