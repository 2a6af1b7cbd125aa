use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chatbot_core::{
    config::Settings, ApplyOutcome, ChatError, ChatMessage, CompletionReply, CompletionTicket,
    ConversationStore, FileStore, LlmClient, LlmResponse, Message, SendOutcome,
    SessionController, SubmitOutcome,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::commands::{self, CommandResult};
use crate::theme::Theme;

/// Stands in for the real client when no API key is configured, so the
/// conversation UI still works and each send records the failure.
struct UnconfiguredClient {
    model: String,
    reason: String,
}

#[async_trait]
impl LlmClient for UnconfiguredClient {
    async fn chat(&self, _messages: &[Message]) -> Result<LlmResponse, ChatError> {
        Err(ChatError::Config(self.reason.clone()))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn open_controller(settings: &Settings) -> Result<(SessionController, Option<String>)> {
    let data_dir = settings.data_dir();
    let backend = FileStore::new(&data_dir)?;
    let store = ConversationStore::open(Box::new(backend))?;
    info!(data_dir = %data_dir.display(), conversations = store.len(), "opened conversation store");

    let (llm, warning): (Arc<dyn LlmClient>, Option<String>) = match settings.build_llm_client() {
        Ok(llm) => (llm, None),
        Err(e) => {
            warn!(error = %e, "completion client unavailable");
            let client = UnconfiguredClient {
                model: settings.llm.model.clone(),
                reason: e.to_string(),
            };
            (Arc::new(client), Some(e.to_string()))
        }
    };

    let controller = SessionController::new(store, llm).with_options(settings.session_options());
    Ok((controller, warning))
}

// ── Single-prompt mode ──────────────────────────────────────────────────

/// Send one prompt in a fresh conversation and print the reply.
pub async fn run_single_prompt(settings: &Settings, prompt: &str) -> Result<()> {
    let (mut controller, warning) = open_controller(settings)?;
    if let Some(warning) = warning {
        return Err(anyhow!(warning));
    }
    for warning in controller.take_warnings() {
        eprintln!("warning: {warning}");
    }

    controller.new_conversation()?;
    controller.set_input(prompt);

    match controller.send().await? {
        SendOutcome::Ignored => Err(anyhow!("Prompt is empty")),
        SendOutcome::Busy => Err(anyhow!("A request is already in flight")),
        SendOutcome::Created(conversation) => {
            println!("Saved to {}", conversation.display_label);
            Ok(())
        }
        SendOutcome::Completed(ApplyOutcome::Answered(messages)) => {
            if let Some(reply) = messages.last() {
                println!("{}", reply.text);
            }
            Ok(())
        }
        SendOutcome::Completed(ApplyOutcome::Failed { error, .. }) => {
            eprintln!("{}", chatbot_core::session::ASSISTANT_UNAVAILABLE);
            Err(error.into())
        }
        SendOutcome::Completed(ApplyOutcome::Discarded) => Err(anyhow!("Request was cancelled")),
    }
}

// ── Interactive TUI ─────────────────────────────────────────────────────

struct AppState {
    controller: SessionController,
    data_dir: PathBuf,

    /// Local output from commands. Shown under the chat, never stored.
    notice: Vec<String>,
    scroll_offset: usize,

    status_text: String,
    should_quit: bool,
    theme: Theme,
}

impl AppState {
    fn new(controller: SessionController, data_dir: PathBuf, theme_name: &str) -> Self {
        let mut notice = vec![format!(
            "chatbot v{} | {} | {}",
            env!("CARGO_PKG_VERSION"),
            controller.model(),
            data_dir.display()
        )];
        notice.push("Type a message and press Enter. Ctrl+C to quit. /help for commands.".into());

        Self {
            controller,
            data_dir,
            notice,
            scroll_offset: usize::MAX,
            status_text: "Ready".into(),
            should_quit: false,
            theme: Theme::by_name(theme_name),
        }
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_offset = usize::MAX;
    }

    fn show(&mut self, text: impl Into<String>) {
        self.notice = text.into().lines().map(str::to_string).collect();
        self.scroll_to_bottom();
    }

    /// Show anything the store worked around, such as an unreadable file.
    fn surface_warnings(&mut self) {
        let warnings = self.controller.take_warnings();
        if !warnings.is_empty() {
            self.status_text = format!("Warning: {}", warnings.join("; "));
        }
    }

    fn report_error(&mut self, error: ChatError) {
        warn!(error = %error, "storage operation failed");
        self.status_text = format!("Error: {error}");
    }

    /// Conversation `step` places away from the active one in the list.
    fn neighbour(&self, step: isize) -> Option<String> {
        let list = self.controller.store().list_conversations();
        if list.is_empty() {
            return None;
        }
        let current = self
            .controller
            .store()
            .active_id()
            .and_then(|id| list.iter().position(|c| c.id == id));
        let target = match current {
            Some(i) => i as isize + step,
            None => 0,
        };
        if target < 0 || target as usize >= list.len() {
            return None;
        }
        Some(list[target as usize].id.clone())
    }

    fn select(&mut self, id: &str) {
        match self.controller.select_conversation(id) {
            Ok(true) => {
                self.notice.clear();
                if let Some(conv) = self.controller.store().active() {
                    self.status_text = conv.display_label.clone();
                }
                self.scroll_to_bottom();
            }
            Ok(false) => self.status_text = format!("No conversation {id}"),
            Err(e) => self.report_error(e),
        }
    }

    fn delete(&mut self, id: &str) {
        match self.controller.delete_conversation(id) {
            Ok(true) => {
                self.notice.clear();
                self.status_text = "Conversation deleted".into();
                self.surface_warnings();
                self.scroll_to_bottom();
            }
            Ok(false) => self.status_text = format!("No conversation {id}"),
            Err(e) => self.report_error(e),
        }
    }

    fn new_conversation(&mut self) {
        match self.controller.new_conversation() {
            Ok(conv) => {
                self.notice.clear();
                self.status_text = format!("Started {}", conv.display_label);
                self.scroll_to_bottom();
            }
            Err(e) => self.report_error(e),
        }
    }
}

pub async fn run_tui(settings: Settings, theme_name: &str) -> Result<()> {
    let (controller, warning) = open_controller(&settings)?;
    let mut state = AppState::new(controller, settings.data_dir(), theme_name);
    if let Some(warning) = warning {
        state.status_text = warning;
    }
    state.surface_warnings();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut state).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Abandon anything still outstanding; the user message is already saved.
    state.controller.cancel_pending();
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
) -> Result<()> {
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<CompletionReply>();

    loop {
        // Draw
        terminal.draw(|f| draw_ui(f, state))?;

        // Apply finished requests (non-blocking)
        while let Ok(reply) = reply_rx.try_recv() {
            handle_reply(state, reply);
        }

        // Handle keyboard input with timeout
        if event::poll(std::time::Duration::from_millis(33))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(state, key, &reply_tx);
                }
            }
        }

        if state.should_quit {
            break;
        }
    }

    Ok(())
}

/// Run a prepared request on the runtime and post its reply back to the loop.
fn spawn_completion(
    state: &AppState,
    ticket: CompletionTicket,
    reply_tx: &mpsc::UnboundedSender<CompletionReply>,
) {
    let request = state.controller.dispatch(ticket);
    let tx = reply_tx.clone();
    tokio::spawn(async move {
        let _ = tx.send(request.await);
    });
}

fn handle_reply(state: &mut AppState, reply: CompletionReply) {
    match state.controller.apply_reply(reply) {
        Ok(ApplyOutcome::Answered(_)) => {
            state.status_text = "Ready".into();
            state.scroll_to_bottom();
        }
        Ok(ApplyOutcome::Failed { error, .. }) => {
            state.status_text = if error.is_network() {
                format!("Could not reach the assistant: {error}")
            } else {
                format!("Request failed: {error}")
            };
            state.scroll_to_bottom();
        }
        Ok(ApplyOutcome::Discarded) => {}
        Err(e) => state.report_error(e),
    }
}

fn submit_input(state: &mut AppState, reply_tx: &mpsc::UnboundedSender<CompletionReply>) {
    let input = state.controller.input().trim().to_string();
    if input.starts_with('/') {
        let result = commands::handle_command(&input);
        if result != CommandResult::NotACommand {
            state.controller.set_input("");
            handle_command_result(state, result);
            return;
        }
    }

    match state.controller.submit() {
        Ok(SubmitOutcome::Ignored) => {}
        Ok(SubmitOutcome::Busy) => {
            state.status_text = "Still waiting for a reply (Esc cancels)".into();
        }
        Ok(SubmitOutcome::Created(conv)) => {
            state.notice.clear();
            state.status_text = format!("Started {}", conv.display_label);
            state.scroll_to_bottom();
        }
        Ok(SubmitOutcome::Dispatched(ticket)) => {
            state.notice.clear();
            state.status_text = "Waiting for reply...".into();
            spawn_completion(state, ticket, reply_tx);
            state.scroll_to_bottom();
        }
        Err(e) => state.report_error(e),
    }
}

fn handle_key(
    state: &mut AppState,
    key: KeyEvent,
    reply_tx: &mpsc::UnboundedSender<CompletionReply>,
) {
    match (key.modifiers, key.code) {
        // Quit
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
            state.should_quit = true;
        }

        // New conversation
        (KeyModifiers::CONTROL, KeyCode::Char('n')) => state.new_conversation(),

        // Delete the open conversation
        (KeyModifiers::CONTROL, KeyCode::Char('d')) => {
            if let Some(id) = state.controller.store().active_id().map(str::to_string) {
                state.delete(&id);
            }
        }

        (_, KeyCode::Esc) => {
            if state.controller.cancel_pending() {
                state.status_text = "Request cancelled".into();
            }
        }

        // Switch conversation
        (_, KeyCode::Up) => {
            if let Some(id) = state.neighbour(-1) {
                state.select(&id);
            }
        }
        (_, KeyCode::Down) => {
            if let Some(id) = state.neighbour(1) {
                state.select(&id);
            }
        }

        // Scroll chat
        (_, KeyCode::PageUp) => {
            state.scroll_offset = state.scroll_offset.saturating_sub(10);
        }
        (_, KeyCode::PageDown) => {
            state.scroll_offset = state.scroll_offset.saturating_add(10);
        }

        (_, KeyCode::Enter) => submit_input(state, reply_tx),

        (_, KeyCode::Backspace) => {
            state.controller.input_mut().pop();
        }

        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
            state.controller.input_mut().push(c);
        }

        _ => {}
    }
}

fn handle_command_result(state: &mut AppState, result: CommandResult) {
    match result {
        CommandResult::Quit => state.should_quit = true,
        CommandResult::Message(msg) => state.show(msg),
        CommandResult::NewConversation => state.new_conversation(),
        CommandResult::ListConversations => {
            let store = state.controller.store();
            let text = if store.is_empty() {
                "No conversations yet.".to_string()
            } else {
                let active = store.active_id();
                store
                    .list_conversations()
                    .iter()
                    .enumerate()
                    .map(|(i, c)| {
                        let marker = if Some(c.id.as_str()) == active { '*' } else { ' ' };
                        format!("{marker}{:>3}. {}  {}", i + 1, c.display_label, &c.id[..c.id.len().min(8)])
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            state.show(text);
        }
        CommandResult::SelectConversation(reference) => {
            let id = commands::resolve_conversation(
                state.controller.store().list_conversations(),
                &reference,
            )
            .map(str::to_string);
            match id {
                Some(id) => state.select(&id),
                None => state.status_text = format!("No conversation matches '{reference}'"),
            }
        }
        CommandResult::DeleteConversation(reference) => {
            let id = match reference {
                Some(reference) => commands::resolve_conversation(
                    state.controller.store().list_conversations(),
                    &reference,
                )
                .map(str::to_string),
                None => state.controller.store().active_id().map(str::to_string),
            };
            match id {
                Some(id) => state.delete(&id),
                None => state.status_text = "No conversation to delete".into(),
            }
        }
        CommandResult::InsertEmoji(glyph) => state.controller.insert_emoji(&glyph),
        CommandResult::Cancel => {
            state.status_text = if state.controller.cancel_pending() {
                "Request cancelled".into()
            } else {
                "Nothing to cancel".into()
            };
        }
        CommandResult::ShowStatus => {
            let store = state.controller.store();
            let active = store
                .active()
                .map(|c| format!("{} ({})", c.display_label, c.id))
                .unwrap_or_else(|| "none".into());
            let text = format!(
                "Model:         {}\nConversation:  {}\nMessages:      {}\nConversations: {}\nWaiting:       {}\nData:          {}",
                state.controller.model(),
                active,
                store.active_messages().len(),
                store.len(),
                if state.controller.is_typing() { "yes" } else { "no" },
                state.data_dir.display(),
            );
            state.show(text);
        }
        CommandResult::ThemeChanged(name) => {
            state.theme = Theme::by_name(&name);
            state.status_text = format!("Theme: {}", state.theme.name);
        }
        CommandResult::NotACommand => {}
    }
}

// ── Drawing ─────────────────────────────────────────────────────────────

fn draw_ui(f: &mut ratatui::Frame, state: &mut AppState) {
    // Sidebar + main column
    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(40)])
        .split(f.area());

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // chat
            Constraint::Length(3), // input
            Constraint::Length(1), // status
        ])
        .split(h_chunks[1]);

    draw_sidebar(f, h_chunks[0], state);
    draw_chat(f, main_chunks[0], state);
    draw_input(f, main_chunks[1], state);
    draw_status_bar(f, main_chunks[2], state);
}

fn draw_sidebar(f: &mut ratatui::Frame, area: Rect, state: &AppState) {
    let theme = &state.theme;
    let store = state.controller.store();
    let active = store.active_id();

    let items: Vec<ListItem> = store
        .list_conversations()
        .iter()
        .map(|c| {
            let style = if Some(c.id.as_str()) == active {
                Style::default()
                    .fg(theme.selected)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.fg)
            };
            let pending = if state.controller.pending_conversation_id() == Some(c.id.as_str()) {
                " …"
            } else {
                ""
            };
            ListItem::new(Line::from(Span::styled(
                format!("{}{pending}", c.display_label),
                style,
            )))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Chats ({}) ", store.len()))
            .border_style(Style::default().fg(theme.border)),
    );
    f.render_widget(list, area);
}

fn draw_chat(f: &mut ratatui::Frame, area: Rect, state: &mut AppState) {
    let theme = &state.theme;
    let title = state
        .controller
        .store()
        .active()
        .map(|c| format!(" {} ", c.display_label))
        .unwrap_or_else(|| " New chat ".into());

    let chat_lines = build_chat_lines(
        state.controller.store().active_messages(),
        state.controller.is_typing()
            && state.controller.pending_conversation_id() == state.controller.store().active_id(),
        &state.notice,
        theme,
    );
    let total_lines = chat_lines.len();

    // Calculate visible height (area height - 2 for borders)
    let visible_height = area.height.saturating_sub(2) as usize;
    let max_scroll = total_lines.saturating_sub(visible_height);
    if state.scroll_offset > max_scroll {
        state.scroll_offset = max_scroll;
    }

    let chat = Paragraph::new(Text::from(chat_lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(theme.border)),
        )
        .wrap(Wrap { trim: false })
        .scroll((clamp_u16(state.scroll_offset), 0));
    f.render_widget(chat, area);

    if total_lines > visible_height {
        let mut scrollbar_state = ScrollbarState::new(max_scroll).position(state.scroll_offset);
        f.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("^"))
                .end_symbol(Some("v")),
            area,
            &mut scrollbar_state,
        );
    }
}

fn render_message_lines<'a>(msg: &'a ChatMessage, theme: &Theme) -> Vec<Line<'a>> {
    let (label, color) = if msg.is_user() {
        ("You", theme.user_color)
    } else {
        ("Assistant", theme.assistant_color)
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("{label} "),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(msg.timestamp.as_str(), Style::default().fg(theme.muted)),
    ])];
    for line in msg.text.lines() {
        lines.push(Line::from(Span::styled(
            format!("  {line}"),
            Style::default().fg(theme.fg),
        )));
    }
    lines
}

fn build_chat_lines<'a>(
    messages: &'a [ChatMessage],
    typing: bool,
    notice: &'a [String],
    theme: &Theme,
) -> Vec<Line<'a>> {
    let mut chat_lines: Vec<Line> = Vec::new();

    for msg in messages {
        chat_lines.extend(render_message_lines(msg, theme));
        chat_lines.push(Line::raw(""));
    }

    if typing {
        chat_lines.push(Line::from(Span::styled(
            "  Typing...",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::ITALIC),
        )));
        chat_lines.push(Line::raw(""));
    }

    for line in notice {
        chat_lines.push(Line::from(Span::styled(
            line.as_str(),
            Style::default().fg(theme.muted),
        )));
    }

    chat_lines
}

fn draw_input(f: &mut ratatui::Frame, area: Rect, state: &AppState) {
    let theme = &state.theme;
    let input = state.controller.input();

    let title = if state.controller.is_typing() {
        " Input (waiting for reply, Esc cancels) "
    } else if input.starts_with('/') {
        " Command "
    } else {
        " Input "
    };

    let widget = Paragraph::new(input)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(if input.starts_with('/') {
                    theme.accent
                } else {
                    theme.border
                })),
        )
        .style(Style::default().fg(theme.fg));
    f.render_widget(widget, area);

    let cursor_x = area
        .x
        .saturating_add(clamp_u16(input.chars().count()))
        .saturating_add(1);
    // Clamp cursor to area width
    let max_x = area.x.saturating_add(area.width.saturating_sub(2));
    f.set_cursor_position((cursor_x.min(max_x), area.y.saturating_add(1)));
}

fn draw_status_bar(f: &mut ratatui::Frame, area: Rect, state: &AppState) {
    let theme = &state.theme;
    let status_style = if state.status_text.starts_with("Error")
        || state.status_text.starts_with("Warning")
    {
        Style::default().fg(theme.error)
    } else {
        Style::default().fg(theme.muted)
    };

    let status_spans = vec![
        Span::styled(
            format!(" {} ", state.controller.model()),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("| ", Style::default().fg(theme.muted)),
        Span::styled(state.status_text.as_str(), status_style),
    ];
    let status = Paragraph::new(Line::from(status_spans));
    f.render_widget(status, area);
}

fn clamp_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}
