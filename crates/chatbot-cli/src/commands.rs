use chatbot_core::ConversationSummary;

/// Result of processing a slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Display a message to the user.
    Message(String),
    /// Quit the application.
    Quit,
    /// Start a fresh conversation.
    NewConversation,
    /// List saved conversations.
    ListConversations,
    /// Switch to a conversation by list number or id prefix.
    SelectConversation(String),
    /// Delete a conversation by list number or id prefix, or the active one.
    DeleteConversation(Option<String>),
    /// Append an emoji to the input line.
    InsertEmoji(String),
    /// Abort the request in flight.
    Cancel,
    /// Show status (model, conversation, data directory).
    ShowStatus,
    /// Change the theme.
    ThemeChanged(String),
    /// Not a command - treat as regular input.
    NotACommand,
}

/// Shortcodes accepted by `/emoji`.
const EMOJI: &[(&str, &str)] = &[
    ("smile", "😄"),
    ("grin", "😁"),
    ("joy", "😂"),
    ("wink", "😉"),
    ("heart", "❤️"),
    ("thumbsup", "👍"),
    ("thumbsdown", "👎"),
    ("clap", "👏"),
    ("wave", "👋"),
    ("pray", "🙏"),
    ("fire", "🔥"),
    ("tada", "🎉"),
    ("rocket", "🚀"),
    ("thinking", "🤔"),
    ("eyes", "👀"),
    ("cry", "😢"),
    ("robot", "🤖"),
    ("star", "⭐"),
];

pub fn emoji_names() -> Vec<&'static str> {
    EMOJI.iter().map(|(name, _)| *name).collect()
}

/// Look up a shortcode, with or without surrounding colons.
pub fn resolve_emoji(name: &str) -> Option<&'static str> {
    let name = name.trim().trim_matches(':').to_lowercase();
    EMOJI
        .iter()
        .find(|(code, _)| *code == name)
        .map(|(_, glyph)| *glyph)
}

/// Resolve a 1-based list number or a unique id prefix to a conversation id.
pub fn resolve_conversation<'a>(
    conversations: &'a [ConversationSummary],
    reference: &str,
) -> Option<&'a str> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    if let Ok(n) = reference.parse::<usize>() {
        if n >= 1 && n <= conversations.len() {
            return Some(conversations[n - 1].id.as_str());
        }
    }

    let mut matches = conversations.iter().filter(|c| c.id.starts_with(reference));
    match (matches.next(), matches.next()) {
        (Some(only), None) => Some(only.id.as_str()),
        _ => None,
    }
}

pub fn handle_command(input: &str) -> CommandResult {
    let parts: Vec<&str> = input.trim().splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/help" | "/h" => show_help(),
        "/exit" | "/quit" | "/q" => CommandResult::Quit,
        "/new" => CommandResult::NewConversation,
        "/list" | "/chats" => CommandResult::ListConversations,
        "/select" | "/open" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /select <number|id>".into())
            } else {
                CommandResult::SelectConversation(arg.to_string())
            }
        }
        "/delete" | "/rm" => {
            if arg.is_empty() {
                CommandResult::DeleteConversation(None)
            } else {
                CommandResult::DeleteConversation(Some(arg.to_string()))
            }
        }
        "/emoji" => {
            if arg.is_empty() {
                CommandResult::Message(format!(
                    "Available emoji: {}\nUsage: /emoji <name>",
                    emoji_names().join(", ")
                ))
            } else if let Some(glyph) = resolve_emoji(arg) {
                CommandResult::InsertEmoji(glyph.to_string())
            } else if !arg.is_ascii() {
                // Already a glyph.
                CommandResult::InsertEmoji(arg.to_string())
            } else {
                CommandResult::Message(format!("Unknown emoji: {arg}. Type /emoji for the list."))
            }
        }
        "/cancel" => CommandResult::Cancel,
        "/status" => CommandResult::ShowStatus,
        "/theme" => {
            if arg.is_empty() {
                let themes = crate::theme::Theme::all_names().join(", ");
                CommandResult::Message(format!("Available themes: {themes}\nUsage: /theme <theme-name>"))
            } else {
                CommandResult::ThemeChanged(arg.to_string())
            }
        }
        "/version" => CommandResult::Message(format!("chatbot v{}", env!("CARGO_PKG_VERSION"))),

        // Unknown command
        _ => {
            if input.trim_start().starts_with('/') {
                CommandResult::Message(format!("Unknown command: {cmd}. Type /help for commands."))
            } else {
                CommandResult::NotACommand
            }
        }
    }
}

fn show_help() -> CommandResult {
    let help_text = "\
Chatbot commands

  CONVERSATIONS
    /new                      Start a fresh conversation
    /list, /chats             List conversations
    /select <n|id>            Switch conversation (list number or id prefix)
    /delete [n|id]            Delete a conversation (default: the open one)

  INPUT
    /emoji <name>             Append an emoji to the input
    /cancel                   Cancel the reply being waited on

  OTHER
    /status                   Show model, conversation and storage
    /theme <name>             Change color theme
    /version                  Show version information
    /help, /h                 Show this help message
    /exit, /quit, /q          Quit

  KEYS
    Enter send   Ctrl+N new   Ctrl+D delete   Up/Down switch
    PgUp/PgDn scroll   Esc cancel reply   Ctrl+C quit";

    CommandResult::Message(help_text.into())
}
