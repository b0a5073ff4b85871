//! Typed HTTP client for the remote agent service.
//!
//! Covers the three endpoints the shell talks to: `POST /api/chat`,
//! `GET /api/status`, and `GET /health`. One attempt per call; retry
//! policy belongs to the caller (and the shell deliberately has none).

pub mod client;
pub mod error;

pub use client::AgentClient;
pub use error::AgentError;
