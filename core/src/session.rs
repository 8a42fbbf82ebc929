//! Closing and exiting: what a [`Transition`] means for the host.

use std::sync::Arc;

use crate::flow::{FlowContext, FlowState, Transition};
use crate::template::DocumentHandle;
use crate::workspace::Teardown;

/// Process status for an abandoned or declined setup.
pub const FORCED_EXIT_CODE: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    /// Stop the host process with `code`.
    Terminate { code: i32 },
    /// Reconfiguring a running install; only the wizard goes away.
    KeepHost,
}

/// Instruction for the presentation host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostAction {
    Display(DocumentHandle),
    Nothing,
    ClosePresentation,
    Exit { code: i32 },
}

/// Outcome of the user trying to close the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseIntent {
    /// Already closed; let the window go.
    Allow,
    /// The user changed their mind; keep the window open.
    Cancelled,
    Confirmed(HostAction),
}

/// Owns the flow context and the teardown shared with every exit path.
#[derive(Debug)]
pub struct Session {
    context: FlowContext,
    teardown: Arc<Teardown>,
}

impl Session {
    #[must_use]
    pub fn new(context: FlowContext, teardown: Arc<Teardown>) -> Self {
        Self { context, teardown }
    }

    #[must_use]
    pub fn context(&self) -> &FlowContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut FlowContext {
        &mut self.context
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.context.closed
    }

    #[must_use]
    pub fn is_reconfiguration(&self) -> bool {
        self.context.is_reconfiguration
    }

    #[must_use]
    pub fn teardown(&self) -> Arc<Teardown> {
        Arc::clone(&self.teardown)
    }

    /// Mark the session closed and clean up. Only the first call does anything.
    pub fn request_close(&mut self) -> bool {
        if self.context.closed {
            return false;
        }
        self.context.closed = true;
        self.context.state = FlowState::Closed;
        self.teardown.run();
        tracing::info!("Setup closed");
        true
    }

    /// Clean up, then decide whether the host process should stop.
    pub fn request_exit(&mut self) -> ExitDecision {
        self.teardown.run();
        if self.context.is_reconfiguration {
            tracing::info!("Exit requested during reconfiguration; keeping host alive");
            ExitDecision::KeepHost
        } else {
            tracing::info!(code = FORCED_EXIT_CODE, "Exit requested");
            ExitDecision::Terminate {
                code: FORCED_EXIT_CODE,
            }
        }
    }

    /// Exit, closing only the presentation when the host stays up.
    pub fn exit(&mut self) -> HostAction {
        match self.request_exit() {
            ExitDecision::Terminate { code } => HostAction::Exit { code },
            ExitDecision::KeepHost => {
                self.request_close();
                HostAction::ClosePresentation
            }
        }
    }

    pub fn apply(&mut self, transition: Transition) -> HostAction {
        match transition {
            Transition::Render(doc) => HostAction::Display(doc.handle),
            Transition::Stay => HostAction::Nothing,
            Transition::Close => {
                self.request_close();
                HostAction::ClosePresentation
            }
            Transition::Terminate => self.exit(),
        }
    }

    /// Ask before abandoning setup. `confirm` shows the question and reports
    /// the answer; `on_confirm` runs before exiting.
    pub fn close_intent(
        &mut self,
        confirm: impl FnOnce() -> bool,
        on_confirm: impl FnOnce(),
    ) -> CloseIntent {
        if self.context.closed {
            return CloseIntent::Allow;
        }
        if !confirm() {
            tracing::info!("Close cancelled");
            return CloseIntent::Cancelled;
        }
        on_confirm();
        CloseIntent::Confirmed(self.exit())
    }
}
