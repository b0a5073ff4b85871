//! Shell state for valet: the modal overlay and its focus trap, plus the
//! controller that routes agent actions and sidebar commands into them.
//!
//! The focus trap is UI-framework-agnostic: the hosting layer supplies an
//! ordered list of focusable handles per view and applies focus changes on
//! its next frame.

pub mod controller;
pub mod focus;

pub use controller::{ShellController, SIDEBAR_ITEMS};
pub use focus::{FocusId, ModalCoordinator, TrapKey, TrapOutcome};
