//! The "new version available" prompt.
//!
//! A single page, `update.html`, filled from the update details. Navigating
//! to a `noUpdate` location dismisses it; anything mentioning `update` is the
//! user asking to fetch the new version, which the host opens elsewhere.

use lantern_types::TemplateVariables;

use crate::catalog::Catalog;
use crate::session::{CloseIntent, HostAction, Session};
use crate::template::{TemplateRenderer, is_rendered_copy};

pub const UPDATE_TEMPLATE: &str = "update.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateEvent {
    /// The rendered prompt itself is loading.
    ServedCopy,
    /// The user wants the update.
    OpenUpdate,
    Dismiss,
    Other,
}

/// `noUpdate` is checked before `update` so a dismissal is never read as a
/// request to update.
#[must_use]
pub fn classify_update(location: &str) -> UpdateEvent {
    if is_rendered_copy(location) {
        UpdateEvent::ServedCopy
    } else if location.contains("noUpdate") {
        UpdateEvent::Dismiss
    } else if location.contains("update") {
        UpdateEvent::OpenUpdate
    } else {
        UpdateEvent::Other
    }
}

pub struct UpdatePrompt {
    renderer: TemplateRenderer,
    catalog: Catalog,
    session: Session,
}

impl UpdatePrompt {
    #[must_use]
    pub fn new(renderer: TemplateRenderer, catalog: Catalog, session: Session) -> Self {
        Self {
            renderer,
            catalog,
            session,
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Render the prompt with `details` (version, release notes, and so on).
    pub fn show(&mut self, details: TemplateVariables) -> HostAction {
        tracing::info!(keys = details.len(), "Showing update prompt");
        match self.renderer.render(UPDATE_TEMPLATE, details) {
            Ok(doc) => HostAction::Display(doc.handle),
            Err(e) => {
                tracing::error!("Failed to render update prompt: {e}");
                HostAction::Nothing
            }
        }
    }

    pub fn navigate(&mut self, location: &str) -> HostAction {
        tracing::info!(location, "Got update location");
        match classify_update(location) {
            UpdateEvent::OpenUpdate => {
                tracing::info!(location, "User requested the update");
                HostAction::Nothing
            }
            UpdateEvent::Dismiss => {
                self.session.request_close();
                HostAction::ClosePresentation
            }
            UpdateEvent::ServedCopy | UpdateEvent::Other => HostAction::Nothing,
        }
    }

    /// `confirm` receives the title and the question.
    pub fn close_requested(&mut self, confirm: impl FnOnce(&str, &str) -> bool) -> CloseIntent {
        let title = self.catalog.exit_title();
        let message = self.catalog.ignore_update_prompt();
        self.session
            .close_intent(|| confirm(&title, &message), || {})
    }
}
