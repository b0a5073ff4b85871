//! Application state and the single-consumer event loop.
//!
//! All mutation happens here, one event at a time, in arrival order. The
//! only suspension points are the agent exchange and the telemetry fetch,
//! both running in background tasks that report back over the event
//! channel. An in-flight exchange is never aborted; a new submit is
//! prevented by the disabled input surface while `busy` is set.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use valet_agent::AgentClient;
use valet_core::types::ModalView;
use valet_session::{ChatSession, ExchangeOutcome};
use valet_shell::{FocusId, ShellController, TrapKey, SIDEBAR_ITEMS};
use valet_telemetry::{PollerHandle, TelemetryState};

use crate::tui::{AppEvent, EventHandler, Tui};
use crate::ui;

/// Focus handle of the chat input field.
pub const FOCUS_CHAT_INPUT: &str = "chat.input";
/// Focus handle of the modal close button.
pub const FOCUS_MODAL_CLOSE: &str = "modal.close";

pub struct App {
    pub(crate) session: ChatSession,
    pub(crate) shell: ShellController,
    pub(crate) telemetry: TelemetryState,
    pub(crate) input: String,
    pub(crate) sidebar_idx: usize,
    pub(crate) last_export: Option<PathBuf>,
    client: Arc<AgentClient>,
    events_tx: UnboundedSender<AppEvent>,
    export_dir: PathBuf,
    _poller: Option<PollerHandle>,
    should_quit: bool,
}

impl App {
    pub fn new(
        client: Arc<AgentClient>,
        session: ChatSession,
        poller: Option<PollerHandle>,
        events_tx: UnboundedSender<AppEvent>,
        export_dir: PathBuf,
    ) -> Self {
        let mut shell = ShellController::new();
        shell.register_focusables(
            ModalView::Dashboard,
            vec![FocusId::from(FOCUS_MODAL_CLOSE)],
        );
        shell.register_focusables(ModalView::Tools, vec![FocusId::from(FOCUS_MODAL_CLOSE)]);
        shell.note_focus(FocusId::from(FOCUS_CHAT_INPUT));

        Self {
            session,
            shell,
            telemetry: TelemetryState::new(),
            input: String::new(),
            sidebar_idx: 0,
            last_export: None,
            client,
            events_tx,
            export_dir,
            _poller: poller,
            should_quit: false,
        }
    }

    /// Draw and consume events until quit.
    pub async fn run(&mut self, terminal: &mut Tui, events: &mut EventHandler) -> std::io::Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| ui::render(frame, self))?;
            match events.next().await {
                Some(event) => self.on_event(event),
                None => break,
            }
        }
        Ok(())
    }

    pub(crate) fn on_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Outcome(outcome) => {
                self.session.resolve(outcome, Instant::now(), &mut self.shell);
            }
            AppEvent::Telemetry(telemetry) => self.telemetry.apply(telemetry),
            AppEvent::Tick | AppEvent::Resize => {}
        }
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        // The focus trap has first claim while the modal is open; the chat
        // surface is non-interactive underneath it.
        if self.shell.modal().is_open() {
            match key.code {
                KeyCode::Esc => {
                    self.shell.handle_trap_key(TrapKey::Escape);
                }
                KeyCode::Tab => {
                    self.shell.handle_trap_key(TrapKey::Tab);
                }
                KeyCode::BackTab => {
                    self.shell.handle_trap_key(TrapKey::ShiftTab);
                }
                KeyCode::Enter => self.activate_modal_focus(),
                _ => {}
            }
            return;
        }

        if self.shell.sidebar_open() {
            match key.code {
                KeyCode::Esc => self.shell.toggle_sidebar(),
                KeyCode::Char('b') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.shell.toggle_sidebar()
                }
                KeyCode::Up => {
                    self.sidebar_idx = self.sidebar_idx.saturating_sub(1);
                }
                KeyCode::Down => {
                    self.sidebar_idx = (self.sidebar_idx + 1).min(SIDEBAR_ITEMS.len() - 1);
                }
                KeyCode::Enter => {
                    let label = SIDEBAR_ITEMS[self.sidebar_idx];
                    self.shell.handle_sidebar_command(label);
                }
                _ => {}
            }
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('b') => self.shell.toggle_sidebar(),
                KeyCode::Char('l') => self.session.clear(),
                KeyCode::Char('e') => self.export_history(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Enter => self.submit_from_input(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
    }

    /// Submit the input field's content.
    ///
    /// UI-originated sends clear the field; programmatic callers go through
    /// the session engine directly and leave it alone. Dropped while an
    /// exchange is in flight, which is what the disabled input conveys.
    fn submit_from_input(&mut self) {
        if self.session.is_busy() {
            return;
        }
        let text = self.input.clone();
        if let Some(payload) = self.session.submit(&text) {
            self.input.clear();
            self.dispatch_exchange(payload);
        }
    }

    /// Perform the single outbound call for a turn in the background.
    fn dispatch_exchange(&self, payload: String) {
        let client = Arc::clone(&self.client);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = match client.chat(&payload).await {
                Ok(reply) => ExchangeOutcome::Reply(reply),
                Err(e) => ExchangeOutcome::Failed(e.to_string()),
            };
            let _ = tx.send(AppEvent::Outcome(outcome));
        });
    }

    /// Activate whatever modal element holds focus (only the close button
    /// for the current views).
    fn activate_modal_focus(&mut self) {
        let on_close = self
            .shell
            .current_focus()
            .is_some_and(|focus| focus.0 == FOCUS_MODAL_CLOSE);
        if on_close {
            self.shell.close_modal();
        }
    }

    fn export_history(&mut self) {
        match self.session.export(&self.export_dir, Utc::now()) {
            Ok(path) => {
                info!(path = %path.display(), "History exported");
                self.last_export = Some(path);
            }
            Err(e) => warn!("Export failed: {}", e),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
