use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Greeting shown when a conversation starts (or restarts after a clear).
pub const DEFAULT_GREETING: &str =
    "Hello! Ask me anything about the status of this machine.";

/// Placeholder appended when the agent replies with no usable text.
pub const NO_REPLY_TEXT: &str = "No reply received.";

/// Fixed assistant message appended when the agent cannot be reached.
pub const SEND_FAILED_TEXT: &str = "Failed to reach the server.";

// =============================================================================
// Conversation
// =============================================================================

/// Who authored a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single chat message.
///
/// Messages are immutable once created and ordered by insertion. The
/// timestamp is optional in memory and materialized when the sequence is
/// persisted or exported.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<DateTime<Utc>>,
}

impl Message {
    /// Create a user message with a fresh unique id and no timestamp.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            text: text.into(),
            ts: None,
        }
    }

    /// Create an assistant message with a fresh unique id and no timestamp.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            text: text.into(),
            ts: None,
        }
    }

    /// Copy of this message with the timestamp filled in if absent.
    pub fn with_ts(&self, now: DateTime<Utc>) -> Self {
        Self {
            ts: Some(self.ts.unwrap_or(now)),
            ..self.clone()
        }
    }
}

// =============================================================================
// Agent actions
// =============================================================================

/// View shown inside the modal overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModalView {
    Dashboard,
    Tools,
}

impl fmt::Display for ModalView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModalView::Dashboard => write!(f, "System Monitor"),
            ModalView::Tools => write!(f, "Tools"),
        }
    }
}

/// A side-effect instruction embedded in an agent reply.
///
/// Internally tagged on the wire (`{"type": "OPEN_MODAL", "view": ...}`).
/// Tags this client does not know deserialize to [`AgentAction::Unknown`]
/// so that newer servers remain compatible; the shell controller ignores
/// them. Actions are consumed once and never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AgentAction {
    #[serde(rename = "OPEN_MODAL")]
    OpenModal { view: ModalView },
    #[serde(other)]
    Unknown,
}

// =============================================================================
// Wire shapes
// =============================================================================

/// Body of a `POST /api/chat` response.
///
/// The server answers with `reply` (newer) or `message` (legacy); either may
/// be absent. `action` is an optional side-effect instruction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<AgentAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl ChatReply {
    /// The usable reply text: `reply`, then `message`, skipping empty strings.
    pub fn text(&self) -> Option<&str> {
        self.reply
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.message.as_deref().filter(|s| !s.is_empty()))
    }
}

/// RAM metrics group of a telemetry snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RamStatus {
    pub total_gb: f64,
    pub used_gb: f64,
    pub available_gb: f64,
    pub percent: f64,
}

/// CPU metrics group of a telemetry snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CpuStatus {
    pub percent: f64,
    pub cores_physical: u32,
    pub cores_logical: u32,
    pub freq_current_mhz: f64,
}

/// GPU metrics group of a telemetry snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GpuStatus {
    pub name: String,
    pub temperature_c: f64,
    pub utilization_percent: f64,
    pub memory_used_mb: f64,
    pub memory_total_mb: f64,
}

/// A point-in-time reading of machine metrics.
///
/// Replaced wholesale on every successful poll; a failed poll keeps the
/// previous snapshot and raises an error flag instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub ram: RamStatus,
    pub cpu: CpuStatus,
    pub gpu: GpuStatus,
}

/// Body of a `GET /health` response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot_json() -> &'static str {
        r#"{
            "ram": {"total_gb": 31.9, "used_gb": 12.4, "available_gb": 19.5, "percent": 38.9},
            "cpu": {"percent": 7.2, "cores_physical": 8, "cores_logical": 16, "freq_current_mhz": 3600.0},
            "gpu": {"name": "GeForce RTX 3070", "temperature_c": 54.0, "utilization_percent": 11.0,
                    "memory_used_mb": 1843.0, "memory_total_mb": 8192.0}
        }"#
    }

    // ---- Messages ----

    #[test]
    fn test_user_message_has_unique_id() {
        let a = Message::user("hello");
        let b = Message::user("hello");
        assert_ne!(a.id, b.id);
        assert_eq!(a.role, Role::User);
        assert!(a.ts.is_none());
    }

    #[test]
    fn test_assistant_message_role() {
        let m = Message::assistant("hi");
        assert_eq!(m.role, Role::Assistant);
        assert_eq!(m.text, "hi");
    }

    #[test]
    fn test_with_ts_fills_missing_timestamp() {
        let now = Utc::now();
        let m = Message::user("hello");
        let stamped = m.with_ts(now);
        assert_eq!(stamped.ts, Some(now));
        assert_eq!(stamped.id, m.id);
    }

    #[test]
    fn test_with_ts_keeps_existing_timestamp() {
        let earlier = "2025-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let mut m = Message::user("hello");
        m.ts = Some(earlier);
        let stamped = m.with_ts(Utc::now());
        assert_eq!(stamped.ts, Some(earlier));
    }

    #[test]
    fn test_message_serde_round_trip() {
        let m = Message::assistant("reply").with_ts(Utc::now());
        let json = serde_json::to_string(&m).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn test_message_without_ts_omits_field() {
        let m = Message::user("hello");
        let json = serde_json::to_string(&m).unwrap();
        assert!(!json.contains("\"ts\""));
    }

    // ---- Agent actions ----

    #[test]
    fn test_open_modal_dashboard_parses() {
        let action: AgentAction =
            serde_json::from_str(r#"{"type": "OPEN_MODAL", "view": "DASHBOARD"}"#).unwrap();
        assert_eq!(
            action,
            AgentAction::OpenModal {
                view: ModalView::Dashboard
            }
        );
    }

    #[test]
    fn test_open_modal_tools_parses() {
        let action: AgentAction =
            serde_json::from_str(r#"{"type": "OPEN_MODAL", "view": "TOOLS"}"#).unwrap();
        assert_eq!(
            action,
            AgentAction::OpenModal {
                view: ModalView::Tools
            }
        );
    }

    #[test]
    fn test_unknown_action_tag_parses_to_unknown() {
        let action: AgentAction =
            serde_json::from_str(r#"{"type": "PLAY_SOUND"}"#).unwrap();
        assert_eq!(action, AgentAction::Unknown);
    }

    #[test]
    fn test_unknown_view_is_rejected() {
        let result: std::result::Result<AgentAction, _> =
            serde_json::from_str(r#"{"type": "OPEN_MODAL", "view": "SETTINGS"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_modal_view_display() {
        assert_eq!(ModalView::Dashboard.to_string(), "System Monitor");
        assert_eq!(ModalView::Tools.to_string(), "Tools");
    }

    // ---- Chat reply ----

    #[test]
    fn test_chat_reply_text_prefers_reply() {
        let reply = ChatReply {
            reply: Some("RAM 42%".to_string()),
            message: Some("legacy".to_string()),
            ..ChatReply::default()
        };
        assert_eq!(reply.text(), Some("RAM 42%"));
    }

    #[test]
    fn test_chat_reply_text_falls_back_to_message() {
        let reply = ChatReply {
            message: Some("legacy text".to_string()),
            ..ChatReply::default()
        };
        assert_eq!(reply.text(), Some("legacy text"));
    }

    #[test]
    fn test_chat_reply_empty_strings_count_as_absent() {
        let reply = ChatReply {
            reply: Some(String::new()),
            message: Some(String::new()),
            ..ChatReply::default()
        };
        assert_eq!(reply.text(), None);
    }

    #[test]
    fn test_chat_reply_parses_with_action() {
        let reply: ChatReply = serde_json::from_str(
            r#"{"reply": "ok", "action": {"type": "OPEN_MODAL", "view": "DASHBOARD"}, "success": true}"#,
        )
        .unwrap();
        assert_eq!(reply.text(), Some("ok"));
        assert_eq!(
            reply.action,
            Some(AgentAction::OpenModal {
                view: ModalView::Dashboard
            })
        );
    }

    #[test]
    fn test_chat_reply_parses_empty_object() {
        let reply: ChatReply = serde_json::from_str("{}").unwrap();
        assert_eq!(reply.text(), None);
        assert!(reply.action.is_none());
        assert!(reply.success.is_none());
    }

    #[test]
    fn test_chat_reply_ignores_extra_fields() {
        let reply: ChatReply = serde_json::from_str(
            r#"{"message": "done", "command_type": "ram_status", "timestamp": "2025-06-01T10:00:00"}"#,
        )
        .unwrap();
        assert_eq!(reply.text(), Some("done"));
    }

    // ---- Telemetry ----

    #[test]
    fn test_telemetry_snapshot_parses() {
        let snap: TelemetrySnapshot = serde_json::from_str(sample_snapshot_json()).unwrap();
        assert_eq!(snap.cpu.cores_physical, 8);
        assert_eq!(snap.gpu.name, "GeForce RTX 3070");
        assert!((snap.ram.percent - 38.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_telemetry_snapshot_missing_group_is_rejected() {
        let result: std::result::Result<TelemetrySnapshot, _> =
            serde_json::from_str(r#"{"ram": {"total_gb": 1, "used_gb": 1, "available_gb": 0, "percent": 100}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_telemetry_snapshot_round_trip() {
        let snap: TelemetrySnapshot = serde_json::from_str(sample_snapshot_json()).unwrap();
        let json = serde_json::to_string(&snap).unwrap();
        let back: TelemetrySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn test_health_status_parses() {
        let health: HealthStatus =
            serde_json::from_str(r#"{"status": "healthy", "service": "agent", "timestamp": "x"}"#)
                .unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.service.as_deref(), Some("agent"));
    }
}
