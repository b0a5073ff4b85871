//! The chat session engine: turn-taking, feedback pulses, and persistence.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::warn;

use valet_core::config::ChatConfig;
use valet_core::types::{AgentAction, ChatReply, Message, NO_REPLY_TEXT, SEND_FAILED_TEXT};
use valet_store::HistoryStore;

use crate::error::SessionError;
use crate::voice::VoiceOutput;

/// Terminal outcome of one agent exchange.
#[derive(Debug)]
pub enum ExchangeOutcome {
    /// The server answered with a parsed reply body.
    Reply(ChatReply),
    /// Transport failure or malformed response; both are handled the same.
    Failed(String),
}

/// Consumer of server-issued side-effect instructions.
///
/// A failing sink must not disturb the message flow; [`ChatSession::resolve`]
/// isolates and logs dispatch errors.
pub trait ActionSink {
    fn dispatch(&mut self, action: AgentAction) -> Result<(), SessionError>;
}

/// The conversation state machine.
///
/// All mutation happens on the caller's task; the only suspension point in
/// a turn (the HTTP exchange) lives outside the engine. Callers must
/// respect [`is_busy`](Self::is_busy) before submitting: the engine does
/// not drop or queue overlapping turns, it expects the input surface to be
/// disabled while one is in flight.
pub struct ChatSession {
    messages: Vec<Message>,
    busy: bool,
    reacting_until: Option<Instant>,
    speaking_until: Option<Instant>,
    reaction_pulse: Duration,
    speaking_pulse: Duration,
    greeting: String,
    voice_enabled: bool,
    voice: Box<dyn VoiceOutput>,
    store: HistoryStore,
}

impl ChatSession {
    /// Create a session from persisted history, or a fresh greeting when
    /// the store is empty.
    pub fn new(config: &ChatConfig, store: HistoryStore, voice: Box<dyn VoiceOutput>) -> Self {
        let mut messages = store.load();
        if messages.is_empty() {
            messages.push(Message::assistant(&config.greeting));
        }

        Self {
            messages,
            busy: false,
            reacting_until: None,
            speaking_until: None,
            reaction_pulse: Duration::from_millis(config.reaction_pulse_ms),
            speaking_pulse: Duration::from_millis(config.speaking_pulse_ms),
            greeting: config.greeting.clone(),
            voice_enabled: config.voice_enabled,
            voice,
            store,
        }
    }

    /// The current message sequence, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Whether an exchange is in flight. The input surface must be disabled
    /// while this is true.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Whether the avatar reaction pulse is active at `now`.
    pub fn is_reacting(&self, now: Instant) -> bool {
        self.reacting_until.is_some_and(|until| now < until)
    }

    /// Whether the speaking indicator pulse is active at `now`.
    pub fn is_speaking(&self, now: Instant) -> bool {
        self.speaking_until.is_some_and(|until| now < until)
    }

    /// Begin a turn: append the user message and hand back the payload for
    /// the outbound call.
    ///
    /// Whitespace-only input is a no-op and returns `None`. Clearing the
    /// input buffer is the host UI's concern (and only for submissions that
    /// originated there).
    pub fn submit(&mut self, text: &str) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }

        self.messages.push(Message::user(text));
        self.persist();
        self.busy = true;
        Some(text.to_string())
    }

    /// End a turn with the outcome of the exchange.
    ///
    /// On a reply: appends the assistant message (placeholder when the body
    /// carries no text), re-arms the feedback pulses, speaks the text when
    /// voice is enabled and available, and forwards any action to `sink`.
    /// On failure: appends the fixed error message. The busy flag is always
    /// cleared.
    pub fn resolve(&mut self, outcome: ExchangeOutcome, now: Instant, sink: &mut dyn ActionSink) {
        match outcome {
            ExchangeOutcome::Reply(reply) => {
                let text = reply.text().unwrap_or(NO_REPLY_TEXT).to_string();
                self.messages.push(Message::assistant(&text));
                self.persist();

                self.pulse(now);
                self.speak(&text);

                if let Some(action) = reply.action {
                    if let Err(e) = sink.dispatch(action) {
                        warn!("Action dispatch failed: {}", e);
                    }
                }
            }
            ExchangeOutcome::Failed(reason) => {
                warn!("Agent exchange failed: {}", reason);
                self.messages.push(Message::assistant(SEND_FAILED_TEXT));
                self.persist();
            }
        }

        // The turn always ends, whatever happened above.
        self.busy = false;
    }

    /// Wipe the store and restart from a single fresh greeting.
    ///
    /// The greeting reaches disk on the next append, matching the cleared
    /// state of the store.
    pub fn clear(&mut self) {
        self.store.clear();
        self.messages = vec![Message::assistant(&self.greeting)];
        self.reacting_until = None;
        self.speaking_until = None;
    }

    /// Write an export artifact of the current sequence into `dir`.
    ///
    /// Timestamps are materialized at export time; session state does not
    /// change.
    pub fn export(&self, dir: &Path, now: DateTime<Utc>) -> Result<PathBuf, SessionError> {
        Ok(self.store.export(&self.messages, dir, now)?)
    }

    /// Replace both pulse deadlines. Re-arming on every trigger keeps
    /// overlapping pulses from extending or truncating each other.
    fn pulse(&mut self, now: Instant) {
        self.reacting_until = Some(now + self.reaction_pulse);
        self.speaking_until = Some(now + self.speaking_pulse);
    }

    /// Speak the assistant text, cancelling anything queued first.
    fn speak(&mut self, text: &str) {
        if !self.voice_enabled || !self.voice.is_available() {
            return;
        }
        self.voice.cancel();
        if let Err(e) = self.voice.speak(text) {
            warn!("Speech synthesis failed: {}", e);
        }
    }

    fn persist(&self) {
        self.store.save(&self.messages);
    }
}

// =============================================================================
// Tests
// =============================================================================
