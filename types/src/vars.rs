//! Template variables: the token -> replacement mapping fed to the renderer.

use serde::{Deserialize, Serialize};

/// Literal token names that appear in the page templates.
pub mod tokens {
    pub const LEAD_STRING: &str = "lead_string";
    pub const TITLE_STRING: &str = "title_string";
    pub const BODY_STRING: &str = "body_string";
    pub const ERROR_MESSAGE: &str = "error_message";
    pub const INSTALLATION_TITLE: &str = "installation_title";
    pub const CONTACTS_DIV: &str = "contacts_div";
    pub const RUN_NOW: &str = "run_now";
    pub const FINISH_STRING: &str = "finish_string";
    pub const SELECT_ALL: &str = "select_all";
    pub const CLEAR_ALL: &str = "clear_all";
    pub const APPROVE: &str = "approve";
    pub const TEXT_BODY: &str = "text_body";
    pub const USER_NAME_PASSWORD: &str = "user_name_password";
    pub const GMAIL_USER_NAME: &str = "gmail_user_name";
    pub const GMAIL_PASSWORD: &str = "gmail_password";
    pub const SHOW_CONTACTS: &str = "show_contacts";
    pub const YES_NEED_ACCESS: &str = "yes_need_access";
    pub const NO_PROVIDE_ACCESS: &str = "no_provide_access";
    pub const YES_PROVIDE_ACCESS: &str = "yes_provide_access";
    pub const NO_NEED_ACCESS: &str = "no_need_access";
}

/// Ordered token -> replacement mapping.
///
/// Order matters: the renderer applies the pairs one after another, so text
/// introduced by an earlier replacement can be rewritten by a later token.
/// Re-inserting an existing token replaces its value in place and keeps its
/// original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateVariables {
    entries: Vec<(String, String)>,
}

impl TemplateVariables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(token, value);
        self
    }

    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
        let token = token.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(key, _)| *key == token) {
            slot.1 = value;
        } else {
            self.entries.push((token, value));
        }
    }

    #[must_use]
    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == token)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn contains_key(&self, token: &str) -> bool {
        self.get(token).is_some()
    }

    /// Merge `other` into `self`; tokens in `other` win.
    pub fn merge(&mut self, other: TemplateVariables) {
        for (token, value) in other.entries {
            self.insert(token, value);
        }
    }

    /// Guarantee the keys every render relies on: `error_message` (empty unless
    /// already set) and `installation_title`.
    ///
    /// The defaults go first so substituted values that happen to contain
    /// their token names (contact identifiers, for one) are left alone.
    pub fn ensure_render_defaults(&mut self, installation_title: &str) {
        let mut defaults = Vec::with_capacity(self.entries.len() + 2);
        if !self.contains_key(tokens::ERROR_MESSAGE) {
            defaults.push((tokens::ERROR_MESSAGE.to_string(), String::new()));
        }
        defaults.push((
            tokens::INSTALLATION_TITLE.to_string(),
            installation_title.to_string(),
        ));
        self.entries
            .retain(|(token, _)| token != tokens::INSTALLATION_TITLE);
        defaults.append(&mut self.entries);
        self.entries = defaults;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(token, value)| (token.as_str(), value.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for TemplateVariables
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut vars = Self::new();
        for (token, value) in iter {
            vars.insert(token, value);
        }
        vars
    }
}
