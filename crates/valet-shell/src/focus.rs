//! The modal overlay state machine and keyboard focus trap.

use std::fmt;

use valet_core::types::ModalView;

/// Handle of a focusable element, supplied by the hosting UI layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FocusId(pub String);

impl From<&str> for FocusId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for FocusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Keys the trap interprets while the modal is open. Everything else stays
/// with the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrapKey {
    Tab,
    ShiftTab,
    Escape,
}

/// Result of feeding a key to the trap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrapOutcome {
    /// Key consumed; focus moved to this element.
    Focused(FocusId),
    /// Key consumed; the overlay has nothing focusable, so focus stays put
    /// rather than leaking outside the trap.
    Held,
    /// The modal closed; restore focus to this element if present.
    Closed { restore: Option<FocusId> },
    /// The modal is not open; the key is the host's to handle.
    Ignored,
}

enum State {
    Closed,
    Open {
        view: ModalView,
        focusables: Vec<FocusId>,
        focus: Option<usize>,
        prior: Option<FocusId>,
    },
}

/// Exclusive overlay surface with wrap-around keyboard focus.
///
/// Single writer: only the shell controller transitions it. While open,
/// the chat surface must report itself non-interactive, which hosts read
/// through [`chat_surface_enabled`](Self::chat_surface_enabled).
pub struct ModalCoordinator {
    state: State,
}

impl Default for ModalCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ModalCoordinator {
    pub fn new() -> Self {
        Self {
            state: State::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open { .. })
    }

    /// The view currently shown, if any.
    pub fn view(&self) -> Option<ModalView> {
        match self.state {
            State::Open { view, .. } => Some(view),
            State::Closed => None,
        }
    }

    /// Exclusivity invariant: the chat surface accepts input exactly when
    /// no modal is open.
    pub fn chat_surface_enabled(&self) -> bool {
        !self.is_open()
    }

    /// The element that currently holds focus inside the overlay.
    pub fn focused(&self) -> Option<&FocusId> {
        match &self.state {
            State::Open {
                focusables,
                focus: Some(idx),
                ..
            } => focusables.get(*idx),
            _ => None,
        }
    }

    /// Open the overlay on `view`.
    ///
    /// Records `prior` as the element to restore on close and returns the
    /// initial focus target (the first focusable, if any); the host applies
    /// it on its next frame. Opening while already open switches the view
    /// and keeps the originally recorded prior focus.
    pub fn open(
        &mut self,
        view: ModalView,
        focusables: Vec<FocusId>,
        prior: Option<FocusId>,
    ) -> Option<FocusId> {
        let prior = match std::mem::replace(&mut self.state, State::Closed) {
            State::Open {
                prior: recorded, ..
            } => recorded,
            State::Closed => prior,
        };

        let focus = if focusables.is_empty() { None } else { Some(0) };
        let initial = focus.and_then(|idx| focusables.get(idx).cloned());
        self.state = State::Open {
            view,
            focusables,
            focus,
            prior,
        };
        initial
    }

    /// Close the overlay (close button, backdrop, or Escape), returning the
    /// element recorded at entry so the host can restore focus to it.
    pub fn close(&mut self) -> Option<FocusId> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Open { prior, .. } => prior,
            State::Closed => None,
        }
    }

    /// Feed a key to the trap.
    pub fn handle_key(&mut self, key: TrapKey) -> TrapOutcome {
        if !self.is_open() {
            return TrapOutcome::Ignored;
        }
        if let TrapKey::Escape = key {
            return TrapOutcome::Closed {
                restore: self.close(),
            };
        }

        match &mut self.state {
            State::Closed => TrapOutcome::Ignored,
            State::Open {
                focusables, focus, ..
            } => {
                if focusables.is_empty() {
                    // Suppress Tab entirely so focus cannot leave the trap.
                    return TrapOutcome::Held;
                }
                let len = focusables.len();
                let next = match (key, *focus) {
                    (TrapKey::Tab, Some(idx)) => (idx + 1) % len,
                    (TrapKey::Tab, None) => 0,
                    (TrapKey::ShiftTab, Some(idx)) => (idx + len - 1) % len,
                    (TrapKey::ShiftTab, None) => len - 1,
                    // Escape returned above.
                    (TrapKey::Escape, _) => return TrapOutcome::Ignored,
                };
                *focus = Some(next);
                TrapOutcome::Focused(focusables[next].clone())
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<FocusId> {
        names.iter().map(|n| FocusId::from(*n)).collect()
    }

    // ---- Open / close ----

    #[test]
    fn test_starts_closed_with_chat_enabled() {
        let modal = ModalCoordinator::new();
        assert!(!modal.is_open());
        assert!(modal.chat_surface_enabled());
        assert!(modal.view().is_none());
        assert!(modal.focused().is_none());
    }

    #[test]
    fn test_open_focuses_first_and_disables_chat() {
        let mut modal = ModalCoordinator::new();
        let initial = modal.open(
            ModalView::Dashboard,
            ids(&["modal.refresh", "modal.close"]),
            Some(FocusId::from("chat.input")),
        );

        assert_eq!(initial, Some(FocusId::from("modal.refresh")));
        assert!(modal.is_open());
        assert_eq!(modal.view(), Some(ModalView::Dashboard));
        assert!(!modal.chat_surface_enabled());
        assert_eq!(modal.focused(), Some(&FocusId::from("modal.refresh")));
    }

    #[test]
    fn test_open_with_no_focusables_has_no_initial_focus() {
        let mut modal = ModalCoordinator::new();
        let initial = modal.open(ModalView::Tools, Vec::new(), None);
        assert!(initial.is_none());
        assert!(modal.is_open());
        assert!(modal.focused().is_none());
    }

    #[test]
    fn test_close_returns_prior_focus() {
        let mut modal = ModalCoordinator::new();
        modal.open(
            ModalView::Dashboard,
            ids(&["modal.close"]),
            Some(FocusId::from("chat.input")),
        );

        let restore = modal.close();
        assert_eq!(restore, Some(FocusId::from("chat.input")));
        assert!(!modal.is_open());
        assert!(modal.chat_surface_enabled());
    }

    #[test]
    fn test_close_when_closed_is_noop() {
        let mut modal = ModalCoordinator::new();
        assert!(modal.close().is_none());
        assert!(!modal.is_open());
    }

    #[test]
    fn test_reopen_after_close() {
        let mut modal = ModalCoordinator::new();
        modal.open(ModalView::Dashboard, ids(&["modal.close"]), None);
        modal.close();
        modal.open(ModalView::Tools, ids(&["modal.close"]), None);
        assert_eq!(modal.view(), Some(ModalView::Tools));
    }

    #[test]
    fn test_open_while_open_switches_view_and_keeps_prior() {
        let mut modal = ModalCoordinator::new();
        modal.open(
            ModalView::Dashboard,
            ids(&["modal.close"]),
            Some(FocusId::from("chat.input")),
        );
        // A second open must not record the modal's own focus as prior.
        modal.open(
            ModalView::Tools,
            ids(&["modal.close"]),
            Some(FocusId::from("modal.close")),
        );

        assert_eq!(modal.view(), Some(ModalView::Tools));
        assert_eq!(modal.close(), Some(FocusId::from("chat.input")));
    }

    // ---- Tab wrapping ----

    #[test]
    fn test_tab_cycles_forward_and_wraps() {
        let mut modal = ModalCoordinator::new();
        modal.open(ModalView::Dashboard, ids(&["a", "b", "c"]), None);

        assert_eq!(
            modal.handle_key(TrapKey::Tab),
            TrapOutcome::Focused(FocusId::from("b"))
        );
        assert_eq!(
            modal.handle_key(TrapKey::Tab),
            TrapOutcome::Focused(FocusId::from("c"))
        );
        // Last wraps to first.
        assert_eq!(
            modal.handle_key(TrapKey::Tab),
            TrapOutcome::Focused(FocusId::from("a"))
        );
    }

    #[test]
    fn test_shift_tab_cycles_backward_and_wraps() {
        let mut modal = ModalCoordinator::new();
        modal.open(ModalView::Dashboard, ids(&["a", "b", "c"]), None);

        // First wraps to last.
        assert_eq!(
            modal.handle_key(TrapKey::ShiftTab),
            TrapOutcome::Focused(FocusId::from("c"))
        );
        assert_eq!(
            modal.handle_key(TrapKey::ShiftTab),
            TrapOutcome::Focused(FocusId::from("b"))
        );
    }

    #[test]
    fn test_single_focusable_always_refocuses_itself() {
        let mut modal = ModalCoordinator::new();
        modal.open(ModalView::Dashboard, ids(&["only"]), None);

        for key in [TrapKey::Tab, TrapKey::ShiftTab, TrapKey::Tab, TrapKey::Tab] {
            assert_eq!(
                modal.handle_key(key),
                TrapOutcome::Focused(FocusId::from("only"))
            );
        }
    }

    #[test]
    fn test_zero_focusables_holds_focus() {
        let mut modal = ModalCoordinator::new();
        modal.open(ModalView::Tools, Vec::new(), None);

        assert_eq!(modal.handle_key(TrapKey::Tab), TrapOutcome::Held);
        assert_eq!(modal.handle_key(TrapKey::ShiftTab), TrapOutcome::Held);
        assert!(modal.is_open());
    }

    // ---- Escape ----

    #[test]
    fn test_escape_closes_and_reports_restore_target() {
        let mut modal = ModalCoordinator::new();
        modal.open(
            ModalView::Dashboard,
            ids(&["modal.close"]),
            Some(FocusId::from("chat.input")),
        );

        let outcome = modal.handle_key(TrapKey::Escape);
        assert_eq!(
            outcome,
            TrapOutcome::Closed {
                restore: Some(FocusId::from("chat.input"))
            }
        );
        assert!(!modal.is_open());
        assert!(modal.chat_surface_enabled());
    }

    #[test]
    fn test_escape_with_zero_focusables_still_closes() {
        let mut modal = ModalCoordinator::new();
        modal.open(ModalView::Tools, Vec::new(), None);
        assert_eq!(
            modal.handle_key(TrapKey::Escape),
            TrapOutcome::Closed { restore: None }
        );
        assert!(!modal.is_open());
    }

    #[test]
    fn test_keys_ignored_while_closed() {
        let mut modal = ModalCoordinator::new();
        assert_eq!(modal.handle_key(TrapKey::Tab), TrapOutcome::Ignored);
        assert_eq!(modal.handle_key(TrapKey::ShiftTab), TrapOutcome::Ignored);
        assert_eq!(modal.handle_key(TrapKey::Escape), TrapOutcome::Ignored);
    }
}
