mod store;
mod types;

pub use store::{ConversationStore, CONVERSATION_LIST_KEY, CORRUPT_LIST_KEY};
pub use types::{ChatMessage, Conversation, ConversationSummary, MessageRole};
