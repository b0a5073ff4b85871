//! The shell controller: the single writer of modal and sidebar state.

use std::collections::HashMap;

use tracing::debug;

use valet_core::types::{AgentAction, ModalView};
use valet_session::{ActionSink, SessionError};

use crate::focus::{FocusId, ModalCoordinator, TrapKey, TrapOutcome};

/// Sidebar menu entries, top to bottom.
pub const SIDEBAR_ITEMS: [&str; 3] = ["Dashboard", "Logs", "Settings"];

/// Top-level shell composition state.
///
/// Routes server-issued actions and sidebar commands into modal
/// transitions, owns the sidebar flag, and tracks where keyboard focus
/// sits so the trap can restore it after the overlay closes.
#[derive(Default)]
pub struct ShellController {
    modal: ModalCoordinator,
    sidebar_open: bool,
    focusables: HashMap<ModalView, Vec<FocusId>>,
    current_focus: Option<FocusId>,
}

impl ShellController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the ordered focusable handles the host renders for `view`.
    pub fn register_focusables(&mut self, view: ModalView, ids: Vec<FocusId>) {
        self.focusables.insert(view, ids);
    }

    /// The host reports where keyboard focus currently sits.
    pub fn note_focus(&mut self, id: FocusId) {
        if self.modal.chat_surface_enabled() {
            self.current_focus = Some(id);
        }
    }

    /// The element that should hold keyboard focus, inside or outside the
    /// overlay. The host applies this on its next frame; a handle it can no
    /// longer resolve is simply dropped.
    pub fn current_focus(&self) -> Option<&FocusId> {
        if self.modal.is_open() {
            self.modal.focused()
        } else {
            self.current_focus.as_ref()
        }
    }

    pub fn modal(&self) -> &ModalCoordinator {
        &self.modal
    }

    pub fn chat_surface_enabled(&self) -> bool {
        self.modal.chat_surface_enabled()
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    /// Open the overlay on `view` with that view's registered focusables.
    pub fn open_modal(&mut self, view: ModalView) {
        let focusables = self.focusables.get(&view).cloned().unwrap_or_default();
        let prior = self.current_focus.take();
        self.modal.open(view, focusables, prior);
    }

    /// Close the overlay (close button or backdrop), restoring prior focus.
    pub fn close_modal(&mut self) {
        if self.modal.is_open() {
            self.current_focus = self.modal.close();
        }
    }

    /// Feed a key to the focus trap. Returns true when the trap consumed
    /// it; false means the modal is closed and the key is the host's.
    pub fn handle_trap_key(&mut self, key: TrapKey) -> bool {
        match self.modal.handle_key(key) {
            TrapOutcome::Focused(_) | TrapOutcome::Held => true,
            TrapOutcome::Closed { restore } => {
                self.current_focus = restore;
                true
            }
            TrapOutcome::Ignored => false,
        }
    }

    /// Route a server-issued action. Unknown actions are ignored.
    pub fn handle_action(&mut self, action: AgentAction) {
        match action {
            AgentAction::OpenModal { view } => self.open_modal(view),
            AgentAction::Unknown => debug!("Ignoring unknown agent action"),
        }
    }

    /// Route a sidebar menu command. A recognized dashboard label opens the
    /// dashboard modal and closes the sidebar; anything else is a no-op.
    pub fn handle_sidebar_command(&mut self, label: &str) {
        if label.eq_ignore_ascii_case("dashboard") {
            self.open_modal(ModalView::Dashboard);
            self.sidebar_open = false;
        } else {
            debug!(label, "Ignoring unrecognized sidebar command");
        }
    }
}

impl ActionSink for ShellController {
    fn dispatch(&mut self, action: AgentAction) -> Result<(), SessionError> {
        self.handle_action(action);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
