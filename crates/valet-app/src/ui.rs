//! Rendering. Chat pane, sidebar, and the modal overlay.

use std::time::Instant;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;

use valet_core::types::{ModalView, Role, TelemetrySnapshot};
use valet_shell::SIDEBAR_ITEMS;

use crate::app::{App, FOCUS_MODAL_CLOSE};

const ACCENT: Color = Color::Indexed(105);
const DIM: Color = Color::DarkGray;

pub fn render(frame: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, rows[0]);

    let body = if app.shell.sidebar_open() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(22), Constraint::Min(20)])
            .split(rows[1]);
        render_sidebar(frame, cols[0], app);
        cols[1]
    } else {
        rows[1]
    };

    render_chat(frame, body, app);
    render_input(frame, rows[2], app);
    render_hints(frame, rows[3], app);

    if let Some(view) = app.shell.modal().view() {
        render_modal(frame, view, app);
    }
}

fn render_header(frame: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled("valet", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        Span::raw("  ·  personal agent console"),
    ]))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center);
    frame.render_widget(header, area);
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = SIDEBAR_ITEMS
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            let style = if idx == app.sidebar_idx {
                Style::default().fg(Color::Black).bg(ACCENT)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(format!(" {} ", label), style)))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Menu"));
    frame.render_widget(list, area);
}

fn render_chat(frame: &mut Frame, area: Rect, app: &App) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    render_avatar_line(frame, parts[0], app);

    let inner_height = parts[1].height.saturating_sub(2) as usize;
    let messages = app.session.messages();
    let tail = messages
        .iter()
        .skip(messages.len().saturating_sub(inner_height.max(1)));

    let items: Vec<ListItem> = tail
        .map(|message| {
            let (prefix, style) = match message.role {
                Role::User => ("you ", Style::default().fg(Color::White)),
                Role::Assistant => ("agent ", Style::default().fg(ACCENT)),
            };
            ListItem::new(Line::from(vec![
                Span::styled(prefix, style.add_modifier(Modifier::BOLD)),
                Span::raw(message.text.clone()),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Chat"));
    frame.render_widget(list, parts[1]);
}

fn render_avatar_line(frame: &mut Frame, area: Rect, app: &App) {
    let now = Instant::now();
    let (state, style) = if app.session.is_speaking(now) {
        ("speaking", Style::default().fg(Color::Green))
    } else if app.session.is_reacting(now) {
        ("reacting", Style::default().fg(Color::Yellow))
    } else if app.session.is_busy() {
        ("thinking", Style::default().fg(Color::Yellow))
    } else {
        ("ready", Style::default().fg(DIM))
    };

    let line = Line::from(vec![
        Span::styled("● ", style),
        Span::styled(state, style),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let enabled = app.shell.chat_surface_enabled() && !app.session.is_busy();

    let content = if app.input.is_empty() && enabled {
        Line::from(Span::styled(
            "Ask something, e.g. 'Status RAM'",
            Style::default().fg(DIM),
        ))
    } else if enabled {
        Line::from(vec![Span::raw(app.input.clone()), Span::styled("▏", Style::default().fg(ACCENT))])
    } else {
        Line::from(Span::styled(app.input.clone(), Style::default().fg(DIM)))
    };

    let title = if app.session.is_busy() {
        "Message (waiting for reply)"
    } else if !app.shell.chat_surface_enabled() {
        "Message (modal open)"
    } else {
        "Message"
    };

    let style = if enabled {
        Style::default()
    } else {
        Style::default().fg(DIM)
    };

    let input = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title(title).style(style));
    frame.render_widget(input, area);
}

fn render_hints(frame: &mut Frame, area: Rect, app: &App) {
    let mut hints = vec![Span::styled(
        " Enter send · Ctrl+B menu · Ctrl+L clear · Ctrl+E export · Ctrl+C quit",
        Style::default().fg(DIM),
    )];
    if let Some(path) = &app.last_export {
        hints.push(Span::styled(
            format!("  exported: {}", path.display()),
            Style::default().fg(Color::Green),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

// =============================================================================
// Modal overlay
// =============================================================================

fn render_modal(frame: &mut Frame, view: ModalView, app: &App) {
    let area = centered_rect(72, 70, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", view))
        .border_style(Style::default().fg(ACCENT));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    match view {
        ModalView::Dashboard => render_dashboard(frame, parts[0], app),
        ModalView::Tools => render_tools(frame, parts[0]),
    }

    render_close_button(frame, parts[1], app);

    let footer = Paragraph::new(Line::from(Span::styled(
        "Esc close · Tab cycle · refreshes every 5s",
        Style::default().fg(DIM),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(footer, parts[2]);
}

fn render_dashboard(frame: &mut Frame, area: Rect, app: &App) {
    if let Some(reason) = app.telemetry.error() {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(3)])
            .split(area);
        let banner = Paragraph::new(Line::from(Span::styled(
            format!("Failed to load system data: {}", reason),
            Style::default().fg(Color::Red),
        )));
        frame.render_widget(banner, parts[0]);
        render_cards(frame, parts[1], app.telemetry.snapshot());
    } else if app.telemetry.is_loading() {
        let loading = Paragraph::new("Loading system data...")
            .style(Style::default().fg(DIM))
            .alignment(Alignment::Center);
        frame.render_widget(loading, area);
    } else {
        render_cards(frame, area, app.telemetry.snapshot());
    }
}

fn render_cards(frame: &mut Frame, area: Rect, snapshot: Option<&TelemetrySnapshot>) {
    let Some(snap) = snapshot else {
        return;
    };

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);

    let ram_rows = vec![
        ("Total", format!("{} GB", snap.ram.total_gb)),
        ("Used", format!("{} GB", snap.ram.used_gb)),
        ("Available", format!("{} GB", snap.ram.available_gb)),
        ("Usage", format!("{}%", snap.ram.percent)),
    ];
    let cpu_rows = vec![
        ("Usage", format!("{}%", snap.cpu.percent)),
        ("Physical cores", snap.cpu.cores_physical.to_string()),
        ("Logical cores", snap.cpu.cores_logical.to_string()),
        ("Frequency", format!("{} MHz", snap.cpu.freq_current_mhz)),
    ];
    let gpu_rows = vec![
        ("Name", snap.gpu.name.clone()),
        ("Temperature", format!("{}°C", snap.gpu.temperature_c)),
        ("Usage", format!("{}%", snap.gpu.utilization_percent)),
        (
            "Memory",
            format!(
                "{:.2} GB / {:.2} GB",
                snap.gpu.memory_used_mb / 1024.0,
                snap.gpu.memory_total_mb / 1024.0
            ),
        ),
    ];

    render_card(frame, cols[0], "RAM", ram_rows);
    render_card(frame, cols[1], "CPU", cpu_rows);
    render_card(frame, cols[2], "GPU", gpu_rows);
}

fn render_card(frame: &mut Frame, area: Rect, title: &str, rows: Vec<(&str, String)>) {
    let lines: Vec<Line> = rows
        .into_iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{:<16}", label), Style::default().fg(DIM)),
                Span::raw(value),
            ])
        })
        .collect();

    let card = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });
    frame.render_widget(card, area);
}

fn render_tools(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from("Tool management runs on the agent service."),
        Line::from(""),
        Line::from(Span::styled(
            "Ask in chat, e.g. 'install nginx' or 'list tools'.",
            Style::default().fg(DIM),
        )),
    ];
    let body = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(body, area);
}

fn render_close_button(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app
        .shell
        .current_focus()
        .is_some_and(|focus| focus.0 == FOCUS_MODAL_CLOSE);

    let style = if focused {
        Style::default().fg(Color::Black).bg(ACCENT)
    } else {
        Style::default().fg(DIM)
    };
    let button = Paragraph::new(Line::from(Span::styled(" [ Close ] ", style)))
        .alignment(Alignment::Center);
    frame.render_widget(button, area);
}

/// Rectangle centered in `area`, sized by percentage. Standard popup helper.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
