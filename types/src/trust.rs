//! The set of contacts a user has granted elevated default access.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Add-only set of trusted contact identifiers.
///
/// Invariant: every stored identifier is trimmed and non-empty. Membership is
/// an exact, case-sensitive match on the trimmed value. There is no removal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TrustSet(BTreeSet<String>);

impl TrustSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one identifier. Returns `true` if it was not already trusted.
    pub fn insert(&mut self, identifier: &str) -> bool {
        let trimmed = identifier.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.0.insert(trimmed.to_string())
    }

    /// Union `identifiers` into the set. Returns how many were newly added.
    pub fn extend<I, S>(&mut self, identifiers: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        identifiers
            .into_iter()
            .filter(|id| self.insert(id.as_ref()))
            .count()
    }

    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.0.contains(identifier.trim())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for TrustSet {
    fn from(values: Vec<String>) -> Self {
        let mut set = Self::new();
        set.extend(values);
        set
    }
}

impl From<TrustSet> for Vec<String> {
    fn from(set: TrustSet) -> Self {
        set.0.into_iter().collect()
    }
}
