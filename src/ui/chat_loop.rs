//! Main chat event loop and UI rendering.
//!
//! The loop draws the transcript, the composer, and the mention suggestion
//! popup, handles key events synchronously, and drains a channel of
//! results from spawned async work (reply streams, tool fetches, mention
//! actions). Async actions never touch `App` directly; they report back
//! through [`LoopEvent`] so all state changes happen on the loop.

use std::collections::VecDeque;
use std::error::Error;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use ratatui::crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste,
        EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use unicode_width::UnicodeWidthStr;

use crate::api::client::{AtlasClient, ToolActions};
use crate::api::extract_reply_delta;
use crate::core::app::{ActionKind, App, MentionOutcome};
use crate::core::config::Config;
use crate::core::mention::extract_plain_text;
use crate::core::message::{Message, TranscriptRole};
use crate::core::tool::ClassifiedTool;
use crate::ui::glyphs::{mention_state_glyph, resolve_tool_glyph, ToolIconSource};
use crate::utils::logging::TranscriptLog;

const MAX_POPUP_ROWS: u16 = 6;

#[derive(Debug)]
pub enum LoopEvent {
    ReplyDelta(String),
    ReplyDone,
    ReplyError(String),
    ToolsLoaded(Result<Vec<ClassifiedTool>, String>),
    ActionDone {
        tool: ClassifiedTool,
        kind: ActionKind,
        result: Result<(), String>,
    },
}

pub async fn run_chat(
    config: Config,
    agent_flag: Option<String>,
    log_file: Option<String>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let agent_id = config.resolve_agent(agent_flag)?;
    let api_key = config.resolve_api_key()?;
    let client = Arc::new(AtlasClient::new(config.effective_base_url(), api_key));
    let transcript = TranscriptLog::new(log_file)?;

    let mut app = App::new(agent_id.clone());
    app.notice_info(format!("Chatting with agent {agent_id}. Type @ to mention tools."));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<LoopEvent>();
    spawn_tool_refresh(client.clone(), agent_id.clone(), tx.clone());

    let result = loop {
        terminal.draw(|f| draw_ui(f, &app))?;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        break Ok(());
                    }
                    KeyCode::Esc => {
                        app.suggestions.dismiss();
                    }
                    KeyCode::Up => {
                        if app.suggestions.is_active() {
                            app.suggestions.move_up();
                        } else {
                            app.auto_scroll = false;
                            app.scroll_offset = app.scroll_offset.saturating_sub(1);
                        }
                    }
                    KeyCode::Down => {
                        if app.suggestions.is_active() {
                            app.suggestions.move_down();
                        } else {
                            app.scroll_offset = app.scroll_offset.saturating_add(1);
                        }
                    }
                    KeyCode::Left => {
                        if !app.input_locked() {
                            app.move_caret_left();
                        }
                    }
                    KeyCode::Right => {
                        if !app.input_locked() {
                            app.move_caret_right();
                        }
                    }
                    KeyCode::Tab => {
                        // Tab only confirms; an ambiguous popup swallows it.
                        if let MentionOutcome::Dispatch { tool, kind } = app.confirm_mention() {
                            spawn_action(client.clone(), agent_id.clone(), tool, kind, tx.clone());
                        }
                    }
                    KeyCode::Enter => match app.confirm_mention() {
                        MentionOutcome::Dispatch { tool, kind } => {
                            spawn_action(client.clone(), agent_id.clone(), tool, kind, tx.clone());
                        }
                        MentionOutcome::Inserted => {}
                        MentionOutcome::Fallthrough => {
                            if let Some(wire) = app.take_outgoing_message() {
                                let _ = transcript
                                    .log_message(&format!("You: {}", extract_plain_text(&wire)));
                                app.auto_scroll = true;
                                spawn_reply_stream(
                                    client.clone(),
                                    agent_id.clone(),
                                    wire,
                                    tx.clone(),
                                );
                            }
                        }
                    },
                    KeyCode::Backspace => {
                        if !app.input_locked() {
                            app.backspace();
                        }
                    }
                    KeyCode::Char(c) => {
                        if !app.input_locked() {
                            app.insert_char(c);
                        }
                    }
                    _ => {}
                },
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => {
                        app.auto_scroll = false;
                        app.scroll_offset = app.scroll_offset.saturating_sub(3);
                    }
                    MouseEventKind::ScrollDown => {
                        app.scroll_offset = app.scroll_offset.saturating_add(3);
                    }
                    MouseEventKind::Down(MouseButton::Left) => {
                        if app.suggestions.is_active() && !app.input_locked() {
                            let size = terminal.size()?;
                            let total = Rect::new(0, 0, size.width, size.height);
                            let popup = popup_area(
                                composer_area(total),
                                app.suggestions.match_indices().len(),
                            );
                            if let Some(row) = popup_row_at(popup, mouse.column, mouse.row) {
                                if app.suggestions.select(row) {
                                    if let MentionOutcome::Dispatch { tool, kind } =
                                        app.confirm_mention()
                                    {
                                        spawn_action(
                                            client.clone(),
                                            agent_id.clone(),
                                            tool,
                                            kind,
                                            tx.clone(),
                                        );
                                    }
                                }
                            }
                        }
                    }
                    _ => {}
                },
                Event::Paste(text) => {
                    if !app.input_locked() {
                        app.insert_str(&text);
                    }
                }
                _ => {}
            }
        }

        while let Ok(loop_event) = rx.try_recv() {
            match loop_event {
                LoopEvent::ReplyDelta(delta) => app.append_reply_delta(&delta),
                LoopEvent::ReplyDone => {
                    app.finish_reply();
                    if let Some(last) = app.messages.back() {
                        if last.role.is_assistant() {
                            let _ = transcript.log_message(&last.content);
                        }
                    }
                }
                LoopEvent::ReplyError(error) => app.reply_failed(&error),
                LoopEvent::ToolsLoaded(Ok(tools)) => app.set_tools(tools),
                LoopEvent::ToolsLoaded(Err(error)) => app.tools_fetch_failed(&error),
                LoopEvent::ActionDone { tool, kind, result } => {
                    app.finish_action(&tool, kind, result);
                    if app.tools_stale {
                        spawn_tool_refresh(client.clone(), agent_id.clone(), tx.clone());
                    }
                }
            }
        }
    };

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn spawn_tool_refresh(
    client: Arc<AtlasClient>,
    agent_id: String,
    tx: mpsc::UnboundedSender<LoopEvent>,
) {
    tokio::spawn(async move {
        let result = client
            .list_available_tools(&agent_id)
            .await
            .map_err(|e| e.to_string());
        let _ = tx.send(LoopEvent::ToolsLoaded(result));
    });
}

/// Run one mention action to completion. There is no cancellation: once
/// spawned, the action resolves and reports even if the popup is gone.
fn spawn_action(
    client: Arc<AtlasClient>,
    agent_id: String,
    tool: ClassifiedTool,
    kind: ActionKind,
    tx: mpsc::UnboundedSender<LoopEvent>,
) {
    tokio::spawn(async move {
        let result = match kind {
            ActionKind::Connect => client.connect_tool(&tool).await,
            ActionKind::AddToAgent => client.add_tool_to_agent(&agent_id, &tool).await,
        };
        let _ = tx.send(LoopEvent::ActionDone { tool, kind, result });
    });
}

fn spawn_reply_stream(
    client: Arc<AtlasClient>,
    agent_id: String,
    wire: String,
    tx: mpsc::UnboundedSender<LoopEvent>,
) {
    tokio::spawn(async move {
        let response = match client.send_agent_message(&agent_id, &wire).await {
            Ok(response) => response,
            Err(e) => {
                let _ = tx.send(LoopEvent::ReplyError(e.to_string()));
                return;
            }
        };

        let mut stream = response.bytes_stream();
        let mut buffer = String::new();
        while let Some(chunk) = stream.next().await {
            let Ok(chunk) = chunk else {
                let _ = tx.send(LoopEvent::ReplyError("stream interrupted".to_string()));
                return;
            };
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(newline_pos) = buffer.find('\n') {
                let line = buffer[..newline_pos].trim().to_string();
                buffer.drain(..=newline_pos);

                if let Some(data) = line.strip_prefix("data: ") {
                    if data == "[DONE]" {
                        let _ = tx.send(LoopEvent::ReplyDone);
                        return;
                    }
                    if let Some(delta) = extract_reply_delta(data) {
                        let _ = tx.send(LoopEvent::ReplyDelta(delta));
                    }
                }
            }
        }
        let _ = tx.send(LoopEvent::ReplyDone);
    });
}

// --- rendering --------------------------------------------------------------

fn build_display_lines(messages: &VecDeque<Message>) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    for msg in messages {
        match msg.role {
            TranscriptRole::User => {
                lines.push(Line::from(vec![
                    Span::styled(
                        "You: ",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(&msg.content, Style::default().fg(Color::Cyan)),
                ]));
                lines.push(Line::from(""));
            }
            TranscriptRole::Assistant => {
                if msg.content.is_empty() {
                    continue;
                }
                for content_line in msg.content.lines() {
                    lines.push(Line::from(Span::styled(
                        content_line,
                        Style::default().fg(Color::White),
                    )));
                }
                lines.push(Line::from(""));
            }
            TranscriptRole::AppInfo => {
                lines.push(notice_line(&msg.content, Color::DarkGray));
                lines.push(Line::from(""));
            }
            TranscriptRole::AppWarning => {
                lines.push(notice_line(&msg.content, Color::Yellow));
                lines.push(Line::from(""));
            }
            TranscriptRole::AppError => {
                lines.push(notice_line(&msg.content, Color::Red));
                lines.push(Line::from(""));
            }
        }
    }
    lines
}

fn notice_line(content: &str, color: Color) -> Line<'_> {
    Line::from(vec![
        Span::styled("• ", Style::default().fg(color)),
        Span::styled(content, Style::default().fg(color)),
    ])
}

fn draw_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let lines = build_display_lines(&app.messages);
    let available_height = chunks[0].height.saturating_sub(1);
    let total_lines = lines.len() as u16;
    let max_offset = total_lines.saturating_sub(available_height);
    let scroll_offset = if app.auto_scroll {
        max_offset
    } else {
        app.scroll_offset.min(max_offset)
    };

    let transcript = Paragraph::new(lines)
        .block(Block::default().title(format!("Atlas — {}", app.agent_id)))
        .wrap(Wrap { trim: true })
        .scroll((scroll_offset, 0));
    f.render_widget(transcript, chunks[0]);

    let (input_title, input_style) = if app.input_locked() {
        (
            "Working on it…".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (
            "Message (@ mentions tools, Enter sends, Ctrl+C quits)".to_string(),
            Style::default().fg(Color::Yellow),
        )
    };
    let input = Paragraph::new(app.input.as_str())
        .style(input_style)
        .block(Block::default().borders(Borders::ALL).title(input_title))
        .wrap(Wrap { trim: true });
    f.render_widget(input, chunks[1]);

    if app.suggestions.is_active() {
        draw_suggestions(f, app, chunks[1]);
    }

    if !app.input_locked() {
        let caret_width = app.input[..app.caret].width() as u16;
        f.set_cursor_position((chunks[1].x + caret_width + 1, chunks[1].y + 1));
    }
}

/// The bottom three rows of the frame, matching the layout in `draw_ui`.
fn composer_area(total: Rect) -> Rect {
    let height = total.height.min(3);
    Rect::new(
        total.x,
        total.y + total.height - height,
        total.width,
        height,
    )
}

fn popup_area(input_area: Rect, match_count: usize) -> Rect {
    let rows = (match_count as u16).min(MAX_POPUP_ROWS);
    let height = rows + 2;
    let width = input_area.width.clamp(20, 44);
    let y = input_area.y.saturating_sub(height);
    Rect::new(input_area.x, y, width, height)
}

/// Map a click to a popup row, accounting for the border.
fn popup_row_at(popup: Rect, column: u16, row: u16) -> Option<usize> {
    let inside_x = column > popup.x && column < popup.x + popup.width.saturating_sub(1);
    let inside_y = row > popup.y && row < popup.y + popup.height.saturating_sub(1);
    if inside_x && inside_y {
        Some((row - popup.y - 1) as usize)
    } else {
        None
    }
}

/// Popup anchored just above the composer. Each row shows the provider
/// glyph, the display name, and the connection-state glyph; the pending
/// tool's row shows the loading glyph instead.
fn draw_suggestions(f: &mut Frame, app: &App, input_area: Rect) {
    let matches = app.suggestions.match_indices();
    let area = popup_area(input_area, matches.len());
    let rows = area.height.saturating_sub(2);

    let mut lines = Vec::new();
    for (row, &tool_index) in matches.iter().take(rows as usize).enumerate() {
        let Some(tool) = app.tools.get(tool_index) else {
            continue;
        };
        let style = if row == app.suggestions.selected_index() {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        let state = mention_state_glyph(app.indicator_for(tool));
        let glyph = resolve_tool_glyph(&ToolIconSource::Classified(tool));
        lines.push(Line::from(Span::styled(
            format!("{glyph} {}  {state}", tool.display_name),
            style,
        )));
    }

    let popup = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Tools"));
    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}
