//! Chat session engine for valet.
//!
//! Owns the message sequence, the busy turn-taking state, the transient
//! avatar feedback pulses, voice output, and action forwarding. The engine
//! is deliberately free of I/O: `submit` hands the outbound payload to the
//! caller and `resolve` consumes the terminal outcome of the exchange, so
//! the whole turn state machine is testable without a network.

pub mod engine;
pub mod error;
pub mod voice;

pub use engine::{ActionSink, ChatSession, ExchangeOutcome};
pub use error::SessionError;
pub use voice::{NullVoice, VoiceOutput};
