use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::llm::Message;

/// Who wrote a message. Older data calls these "prompt" and "response".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    #[serde(alias = "prompt")]
    User,
    #[serde(alias = "response")]
    Assistant,
}

/// One turn of a conversation as it is persisted and displayed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    #[serde(alias = "type")]
    pub role: MessageRole,
    pub text: String,
    /// Local wall-clock time, for display only.
    pub timestamp: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: now_time(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, text)
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    /// Wire form for the completion request.
    pub fn to_llm_message(&self) -> Message {
        match self.role {
            MessageRole::User => Message::user(&self.text),
            MessageRole::Assistant => Message::assistant(&self.text),
        }
    }
}

/// List entry for a conversation. Messages live under the conversation's own key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: String,
    #[serde(alias = "displayId")]
    pub display_label: String,
}

/// A conversation with its full message history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: String,
    pub display_label: String,
    pub messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            id: self.id.clone(),
            display_label: self.display_label.clone(),
        }
    }
}

pub(crate) fn now_time() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

pub(crate) fn display_label_now() -> String {
    Local::now().format("Chat %d/%m/%Y %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[test]
    fn test_message_roundtrip_format() {
        let msg = ChatMessage {
            role: MessageRole::Assistant,
            text: "Hello".into(),
            timestamp: "10:00:00".into(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"role": "assistant", "text": "Hello", "timestamp": "10:00:00"})
        );
    }

    #[test]
    fn test_message_accepts_legacy_fields() {
        let legacy = r#"{"type": "prompt", "text": "Hi", "timestamp": "9:41:00 AM"}"#;
        let msg: ChatMessage = serde_json::from_str(legacy).unwrap();
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.text, "Hi");

        let legacy = r#"{"type": "response", "text": "Hey", "timestamp": "9:41:02 AM"}"#;
        let msg: ChatMessage = serde_json::from_str(legacy).unwrap();
        assert_eq!(msg.role, MessageRole::Assistant);
    }

    #[test]
    fn test_summary_accepts_display_id() {
        let legacy = r#"{"id": "abc", "displayId": "Chat 01/02/2024 10:00:00"}"#;
        let summary: ConversationSummary = serde_json::from_str(legacy).unwrap();
        assert_eq!(summary.display_label, "Chat 01/02/2024 10:00:00");

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("displayLabel"));
    }

    #[test]
    fn test_to_llm_message() {
        let msg = ChatMessage::user("Hi").to_llm_message();
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hi");
        assert_eq!(ChatMessage::assistant("x").to_llm_message().role, Role::Assistant);
    }

    #[test]
    fn test_display_label_format() {
        let label = display_label_now();
        assert!(label.starts_with("Chat "));
        // "Chat dd/mm/yyyy HH:MM:SS"
        assert_eq!(label.len(), "Chat 01/01/2024 00:00:00".len());
        assert_eq!(now_time().len(), 8);
    }
}
