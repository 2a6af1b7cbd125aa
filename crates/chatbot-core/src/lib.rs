pub mod error;
pub mod llm;
pub mod storage;
pub mod conversation;
pub mod session;
pub mod config;

// Re-export key types
pub use error::ChatError;
pub use llm::{LlmClient, LlmResponse, Message, OpenAIClient, Role};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use conversation::{ChatMessage, Conversation, ConversationStore, ConversationSummary, MessageRole};
pub use session::{
    ApplyOutcome, CompletionReply, CompletionTicket, SendOutcome, SessionController,
    SessionOptions, SubmitOutcome,
};
pub use config::Settings;
