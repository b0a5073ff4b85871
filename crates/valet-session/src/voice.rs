//! Voice output boundary.
//!
//! The speech engine is an external collaborator; the engine only needs to
//! know whether one is available, how to speak, and how to cancel whatever
//! is queued. At most one utterance is queued at a time: callers cancel
//! before speaking.

use crate::error::SessionError;

/// Abstraction over a speech synthesizer.
pub trait VoiceOutput: Send {
    /// Whether a synthesizer is available on this host.
    fn is_available(&self) -> bool;

    /// Drop any queued or in-progress utterance.
    fn cancel(&mut self);

    /// Queue an utterance.
    fn speak(&mut self, text: &str) -> Result<(), SessionError>;
}

/// Voice output for hosts without a synthesizer. Never available; `speak`
/// is unreachable through the engine but safe to call.
#[derive(Debug, Default)]
pub struct NullVoice;

impl VoiceOutput for NullVoice {
    fn is_available(&self) -> bool {
        false
    }

    fn cancel(&mut self) {}

    fn speak(&mut self, text: &str) -> Result<(), SessionError> {
        tracing::debug!(len = text.len(), "NullVoice discarding utterance");
        Ok(())
    }
}
