// Library interface for chatbot-cli so integration tests can reach the
// command parser and themes. Both files are also declared in main.rs, hence
// the path attributes.

#[path = "commands.rs"]
pub mod commands;

#[path = "theme.rs"]
pub mod theme;

pub use commands::{handle_command, resolve_conversation, resolve_emoji, CommandResult};
pub use theme::Theme;
