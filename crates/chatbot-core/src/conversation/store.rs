use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::types::{display_label_now, ChatMessage, Conversation, ConversationSummary};
use crate::error::{ChatError, Result};
use crate::storage::KeyValueStore;

/// Storage key of the conversation list.
pub const CONVERSATION_LIST_KEY: &str = "chats";

/// Where an unreadable conversation list is kept for manual recovery.
pub const CORRUPT_LIST_KEY: &str = "chats-corrupt";

/// List entry as found on disk. Older data embeds the full message list.
#[derive(Debug, Deserialize)]
struct StoredEntry {
    id: String,
    #[serde(alias = "displayId", alias = "displayLabel")]
    display_label: String,
    #[serde(default)]
    messages: Option<Vec<ChatMessage>>,
}

/// Owns the conversation list and the active selection, and mirrors every
/// mutation to the backing key/value store.
///
/// In-memory state only changes after the matching write succeeded, so a
/// failed write leaves the store exactly as it was.
pub struct ConversationStore {
    backend: Box<dyn KeyValueStore>,
    conversations: Vec<ConversationSummary>,
    active_id: Option<String>,
    active_messages: Vec<ChatMessage>,
    warnings: Vec<String>,
}

impl ConversationStore {
    /// Load the conversation list. The first (newest) conversation becomes active.
    ///
    /// Damaged data does not prevent opening: a malformed list is set aside
    /// under [`CORRUPT_LIST_KEY`] and the store starts empty, and an unreadable
    /// message list leaves the active view empty. Both are reported through
    /// [`take_warnings`](Self::take_warnings).
    pub fn open(backend: Box<dyn KeyValueStore>) -> Result<Self> {
        let mut warnings = Vec::new();
        let entries: Vec<StoredEntry> = match backend.get(CONVERSATION_LIST_KEY)? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(error = %e, "conversation list is malformed, starting empty");
                    set_aside_list(backend.as_ref(), &raw);
                    warnings.push(format!(
                        "Conversation list was unreadable and has been saved as {CORRUPT_LIST_KEY}: {e}"
                    ));
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let mut store = Self {
            backend,
            conversations: Vec::with_capacity(entries.len()),
            active_id: None,
            active_messages: Vec::new(),
            warnings,
        };

        let mut rewrite = false;
        let mut seen = HashSet::new();
        for entry in entries {
            if !seen.insert(entry.id.clone()) {
                warn!(id = %entry.id, "dropping duplicate conversation entry");
                rewrite = true;
                continue;
            }
            if let Some(messages) = entry.messages {
                if store.backend.get(&entry.id)?.is_none() {
                    store.write_messages(&entry.id, &messages)?;
                }
                rewrite = true;
            }
            store.conversations.push(ConversationSummary {
                id: entry.id,
                display_label: entry.display_label,
            });
        }

        if rewrite {
            store.write_list(&store.conversations)?;
            info!(
                conversations = store.conversations.len(),
                "rewrote conversation list without embedded messages"
            );
        }

        if let Some(first) = store.conversations.first().map(|c| c.id.clone()) {
            store.load_active(first);
        }

        debug!(conversations = store.conversations.len(), "opened conversation store");
        Ok(store)
    }

    /// Problems that were worked around without failing an operation, oldest
    /// first. Draining them clears the queue.
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    /// Conversation metadata, newest first.
    pub fn list_conversations(&self) -> &[ConversationSummary] {
        &self.conversations
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&ConversationSummary> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active(&self) -> Option<&ConversationSummary> {
        self.active_id.as_deref().and_then(|id| self.get(id))
    }

    /// Messages of the active conversation as of the last completed mutation.
    pub fn active_messages(&self) -> &[ChatMessage] {
        &self.active_messages
    }

    /// Read a conversation's messages straight from storage.
    pub fn messages(&self, id: &str) -> Result<Vec<ChatMessage>> {
        if !self.contains(id) {
            return Err(ChatError::ConversationNotFound(id.to_string()));
        }
        self.read_messages(id)
    }

    /// Load a conversation with its full history.
    pub fn conversation(&self, id: &str) -> Result<Conversation> {
        let summary = self
            .get(id)
            .ok_or_else(|| ChatError::ConversationNotFound(id.to_string()))?;
        Ok(Conversation {
            id: summary.id.clone(),
            display_label: summary.display_label.clone(),
            messages: self.read_messages(id)?,
        })
    }

    /// Create a conversation, seeded with one user message when
    /// `initial_message` is non-empty. It is prepended and becomes active.
    pub fn create_conversation(&mut self, initial_message: Option<&str>) -> Result<Conversation> {
        let conversation = Conversation {
            id: Uuid::new_v4().to_string(),
            display_label: display_label_now(),
            messages: match initial_message {
                Some(text) if !text.is_empty() => vec![ChatMessage::user(text)],
                _ => Vec::new(),
            },
        };

        // Message list first, so the list never names a conversation without one.
        self.write_messages(&conversation.id, &conversation.messages)?;

        let mut list = Vec::with_capacity(self.conversations.len() + 1);
        list.push(conversation.summary());
        list.extend(self.conversations.iter().cloned());

        if let Err(e) = self.write_list(&list) {
            if let Err(cleanup) = self.backend.remove(&conversation.id) {
                warn!(id = %conversation.id, error = %cleanup, "failed to remove orphaned message list");
            }
            return Err(e);
        }

        self.conversations = list;
        self.active_id = Some(conversation.id.clone());
        self.active_messages = conversation.messages.clone();

        info!(
            id = %conversation.id,
            seeded = !conversation.messages.is_empty(),
            "created conversation"
        );
        Ok(conversation)
    }

    /// Make `id` active and reload its messages. Unknown ids are ignored
    /// and return `false`.
    pub fn select_conversation(&mut self, id: &str) -> Result<bool> {
        if !self.contains(id) {
            debug!(id, "ignoring selection of unknown conversation");
            return Ok(false);
        }

        let messages = self.read_messages(id)?;
        self.active_id = Some(id.to_string());
        self.active_messages = messages;
        debug!(id, messages = self.active_messages.len(), "selected conversation");
        Ok(true)
    }

    /// Remove a conversation and its messages. If it was active, the first
    /// remaining conversation becomes active, or none when the list is empty.
    /// Returns `false` for unknown ids.
    pub fn delete_conversation(&mut self, id: &str) -> Result<bool> {
        let Some(pos) = self.position(id) else {
            debug!(id, "ignoring deletion of unknown conversation");
            return Ok(false);
        };

        let mut list = self.conversations.clone();
        list.remove(pos);
        self.write_list(&list)?;
        self.conversations = list;

        if let Err(e) = self.backend.remove(id) {
            warn!(id, error = %e, "conversation deleted but its messages could not be removed");
        }
        info!(id, remaining = self.conversations.len(), "deleted conversation");

        if self.active_id.as_deref() == Some(id) {
            self.active_id = None;
            self.active_messages = Vec::new();
            if let Some(next) = self.conversations.first().map(|c| c.id.clone()) {
                self.load_active(next);
            }
        }

        Ok(true)
    }

    /// Append a message to a conversation and return its updated history.
    pub fn append_message(&mut self, conversation_id: &str, message: ChatMessage) -> Result<Vec<ChatMessage>> {
        if !self.contains(conversation_id) {
            return Err(ChatError::ConversationNotFound(conversation_id.to_string()));
        }

        let mut messages = self.read_messages(conversation_id)?;
        messages.push(message);
        self.write_messages(conversation_id, &messages)?;

        if self.active_id.as_deref() == Some(conversation_id) {
            self.active_messages = messages.clone();
        }

        debug!(id = conversation_id, messages = messages.len(), "appended message");
        Ok(messages)
    }

    /// Make `id` active. If its messages cannot be read the view stays empty
    /// and a warning is queued; selecting it again retries the read.
    fn load_active(&mut self, id: String) {
        match self.read_messages(&id) {
            Ok(messages) => self.active_messages = messages,
            Err(e) => {
                warn!(id = %id, error = %e, "could not load conversation messages");
                self.active_messages = Vec::new();
                self.warnings.push(e.to_string());
            }
        }
        self.active_id = Some(id);
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.conversations.iter().position(|c| c.id == id)
    }

    fn read_messages(&self, id: &str) -> Result<Vec<ChatMessage>> {
        match self.backend.get(id)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                ChatError::storage(format!("Malformed message list for {id}: {e}"))
            }),
            None => Ok(Vec::new()),
        }
    }

    fn write_messages(&self, id: &str, messages: &[ChatMessage]) -> Result<()> {
        let contents = serde_json::to_string(messages)?;
        self.backend.set(id, &contents)
    }

    fn write_list(&self, list: &[ConversationSummary]) -> Result<()> {
        let contents = serde_json::to_string(list)?;
        self.backend.set(CONVERSATION_LIST_KEY, &contents)
    }
}

fn set_aside_list(backend: &dyn KeyValueStore, raw: &str) {
    let moved = backend
        .set(CORRUPT_LIST_KEY, raw)
        .and_then(|_| backend.remove(CONVERSATION_LIST_KEY));
    if let Err(e) = moved {
        warn!(error = %e, "could not set aside malformed conversation list");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::MessageRole;
    use crate::storage::MemoryStore;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn open_memory() -> (ConversationStore, MemoryStore) {
        let backend = MemoryStore::new();
        let store = ConversationStore::open(Box::new(backend.clone())).unwrap();
        (store, backend)
    }

    /// Memory store whose writes can be switched off.
    #[derive(Clone, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: Arc<AtomicBool>,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(ChatError::storage("quota exceeded"));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(ChatError::storage("quota exceeded"));
            }
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_open_empty() {
        let (store, _) = open_memory();
        assert!(store.is_empty());
        assert_eq!(store.active_id(), None);
        assert!(store.active_messages().is_empty());
    }

    #[test]
    fn test_create_with_initial_message() {
        let (mut store, _) = open_memory();
        let conv = store.create_conversation(Some("hello")).unwrap();

        assert_eq!(conv.messages.len(), 1);
        assert_eq!(conv.messages[0].role, MessageRole::User);
        assert_eq!(conv.messages[0].text, "hello");
        assert_eq!(store.active_id(), Some(conv.id.as_str()));
        assert_eq!(store.active_messages(), conv.messages.as_slice());
        assert!(conv.display_label.starts_with("Chat "));
    }

    #[test]
    fn test_create_without_message_is_empty() {
        let (mut store, _) = open_memory();
        assert!(store.create_conversation(None).unwrap().messages.is_empty());
        assert!(store.create_conversation(Some("")).unwrap().messages.is_empty());
    }

    #[test]
    fn test_create_prepends_and_persists() {
        let (mut store, backend) = open_memory();
        let first = store.create_conversation(None).unwrap();
        let second = store.create_conversation(Some("hi")).unwrap();

        let ids: Vec<&str> = store.list_conversations().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);

        let list: Vec<ConversationSummary> =
            serde_json::from_str(&backend.get(CONVERSATION_LIST_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(list, store.list_conversations());

        // List entries carry metadata only.
        let raw = backend.get(CONVERSATION_LIST_KEY).unwrap().unwrap();
        assert!(!raw.contains("messages"));

        let stored: Vec<ChatMessage> =
            serde_json::from_str(&backend.get(&second.id).unwrap().unwrap()).unwrap();
        assert_eq!(stored, second.messages);
        assert_eq!(backend.get(&first.id).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_ids_are_unique() {
        let (mut store, _) = open_memory();
        for _ in 0..20 {
            store.create_conversation(None).unwrap();
        }
        let ids: HashSet<&str> = store.list_conversations().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn test_select_unknown_is_noop() {
        let (mut store, _) = open_memory();
        let conv = store.create_conversation(Some("a")).unwrap();

        assert!(!store.select_conversation("missing").unwrap());
        assert_eq!(store.active_id(), Some(conv.id.as_str()));
        assert_eq!(store.active_messages().len(), 1);
    }

    #[test]
    fn test_select_reloads_from_storage() {
        let (mut store, backend) = open_memory();
        let a = store.create_conversation(Some("in a")).unwrap();
        let b = store.create_conversation(Some("in b")).unwrap();
        assert_eq!(store.active_id(), Some(b.id.as_str()));

        // Another writer touched a's messages behind our back.
        let external = vec![ChatMessage::user("in a"), ChatMessage::assistant("external")];
        backend
            .set(&a.id, &serde_json::to_string(&external).unwrap())
            .unwrap();

        assert!(store.select_conversation(&a.id).unwrap());
        assert_eq!(store.active_messages(), external.as_slice());

        assert!(store.select_conversation(&b.id).unwrap());
        assert_eq!(store.active_messages().len(), 1);
        assert_eq!(store.active_messages()[0].text, "in b");
    }

    #[test]
    fn test_delete_active_selects_first_remaining() {
        let (mut store, backend) = open_memory();
        let a = store.create_conversation(Some("a")).unwrap();
        let b = store.create_conversation(Some("b")).unwrap();
        let c = store.create_conversation(Some("c")).unwrap();
        // List: [c, b, a]; make b active.
        store.select_conversation(&b.id).unwrap();

        assert!(store.delete_conversation(&b.id).unwrap());
        assert_eq!(store.active_id(), Some(c.id.as_str()));
        assert_eq!(store.active_messages()[0].text, "c");
        assert_eq!(backend.get(&b.id).unwrap(), None);
        assert!(store.contains(&a.id));
        assert!(!store.contains(&b.id));
    }

    #[test]
    fn test_delete_last_clears_active() {
        let (mut store, backend) = open_memory();
        let only = store.create_conversation(Some("only")).unwrap();

        assert!(store.delete_conversation(&only.id).unwrap());
        assert_eq!(store.active_id(), None);
        assert!(store.active_messages().is_empty());
        assert_eq!(backend.get(CONVERSATION_LIST_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_delete_non_active_keeps_selection() {
        let (mut store, _) = open_memory();
        let first = store.create_conversation(Some("first")).unwrap();
        let second = store.create_conversation(Some("second")).unwrap();
        assert_eq!(store.active_id(), Some(second.id.as_str()));

        assert!(store.delete_conversation(&first.id).unwrap());
        assert_eq!(store.active_id(), Some(second.id.as_str()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.active_messages()[0].text, "second");
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let (mut store, _) = open_memory();
        store.create_conversation(None).unwrap();
        assert!(!store.delete_conversation("nope").unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_append_preserves_order() {
        let (mut store, _) = open_memory();
        let conv = store.create_conversation(Some("one")).unwrap();

        let before = store.messages(&conv.id).unwrap();
        let middle = store
            .append_message(&conv.id, ChatMessage::assistant("two"))
            .unwrap();
        let after = store
            .append_message(&conv.id, ChatMessage::user("three"))
            .unwrap();

        assert_eq!(&middle[..1], &before[..]);
        assert_eq!(&after[..2], &middle[..]);
        let texts: Vec<&str> = after.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
        assert_eq!(store.active_messages(), after.as_slice());
    }

    #[test]
    fn test_append_to_inactive_does_not_touch_view() {
        let (mut store, _) = open_memory();
        let a = store.create_conversation(Some("a")).unwrap();
        let b = store.create_conversation(Some("b")).unwrap();

        store.append_message(&a.id, ChatMessage::assistant("late")).unwrap();
        assert_eq!(store.active_id(), Some(b.id.as_str()));
        assert_eq!(store.active_messages().len(), 1);
        assert_eq!(store.messages(&a.id).unwrap().len(), 2);
    }

    #[test]
    fn test_append_unknown_conversation() {
        let (mut store, _) = open_memory();
        let err = store
            .append_message("ghost", ChatMessage::user("boo"))
            .unwrap_err();
        assert!(matches!(err, ChatError::ConversationNotFound(id) if id == "ghost"));
    }

    #[test]
    fn test_reopen_restores_state() {
        let backend = MemoryStore::new();
        let (older, newer) = {
            let mut store = ConversationStore::open(Box::new(backend.clone())).unwrap();
            let older = store.create_conversation(Some("older")).unwrap();
            let newer = store.create_conversation(Some("newer")).unwrap();
            store.append_message(&newer.id, ChatMessage::assistant("reply")).unwrap();
            store.select_conversation(&older.id).unwrap();
            (older, newer)
        };

        let store = ConversationStore::open(Box::new(backend)).unwrap();
        assert_eq!(store.len(), 2);
        // The newest conversation is active after a reload.
        assert_eq!(store.active_id(), Some(newer.id.as_str()));
        assert_eq!(store.active_messages().len(), 2);
        assert_eq!(store.conversation(&older.id).unwrap().messages[0].text, "older");
    }

    #[test]
    fn test_open_imports_embedded_messages() {
        let backend = MemoryStore::new();
        let legacy = r#"[
            {"id": "chat-2", "displayId": "Chat 02/01/2024 10:00:00",
             "messages": [{"type": "prompt", "text": "Hi", "timestamp": "10:00:01"},
                          {"type": "response", "text": "Hello!", "timestamp": "10:00:03"}]},
            {"id": "chat-1", "displayId": "Chat 01/01/2024 09:00:00", "messages": []}
        ]"#;
        backend.set(CONVERSATION_LIST_KEY, legacy).unwrap();
        // chat-1 already has its own key, which wins over the embedded copy.
        backend
            .set("chat-1", r#"[{"type": "prompt", "text": "kept", "timestamp": "09:00:01"}]"#)
            .unwrap();

        let store = ConversationStore::open(Box::new(backend.clone())).unwrap();

        assert_eq!(store.active_id(), Some("chat-2"));
        assert_eq!(store.active_messages().len(), 2);
        assert_eq!(store.active_messages()[1].role, MessageRole::Assistant);
        assert_eq!(store.messages("chat-1").unwrap()[0].text, "kept");

        let raw = backend.get(CONVERSATION_LIST_KEY).unwrap().unwrap();
        assert!(!raw.contains("messages"));
        assert!(raw.contains("displayLabel"));
    }

    #[test]
    fn test_open_drops_duplicate_ids() {
        let backend = MemoryStore::new();
        backend
            .set(
                CONVERSATION_LIST_KEY,
                r#"[{"id": "x", "displayLabel": "one"}, {"id": "x", "displayLabel": "two"}]"#,
            )
            .unwrap();

        let store = ConversationStore::open(Box::new(backend)).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("x").unwrap().display_label, "one");
    }

    #[test]
    fn test_open_malformed_list_starts_empty() {
        let backend = MemoryStore::new();
        backend.set(CONVERSATION_LIST_KEY, "{not json").unwrap();

        let mut store = ConversationStore::open(Box::new(backend.clone())).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.active_id(), None);
        assert_eq!(backend.get(CORRUPT_LIST_KEY).unwrap().as_deref(), Some("{not json"));
        assert_eq!(backend.get(CONVERSATION_LIST_KEY).unwrap(), None);

        let warnings = store.take_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains(CORRUPT_LIST_KEY));
        assert!(store.take_warnings().is_empty());

        // The store is usable afterwards.
        store.create_conversation(Some("fresh")).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_open_with_unreadable_active_messages() {
        let (mut store, backend) = open_memory();
        let older = store.create_conversation(Some("older")).unwrap();
        let newest = store.create_conversation(Some("newest")).unwrap();
        backend.set(&newest.id, "{oops").unwrap();

        let mut store = ConversationStore::open(Box::new(backend.clone())).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.active_id(), Some(newest.id.as_str()));
        assert!(store.active_messages().is_empty());
        assert_eq!(store.take_warnings().len(), 1);

        assert!(store.select_conversation(&older.id).unwrap());
        assert_eq!(store.active_messages()[0].text, "older");
    }

    #[test]
    fn test_delete_commits_even_if_next_conversation_is_unreadable() {
        let (mut store, backend) = open_memory();
        let a = store.create_conversation(Some("a")).unwrap();
        let b = store.create_conversation(Some("b")).unwrap();
        backend.set(&a.id, "{oops").unwrap();

        assert!(store.delete_conversation(&b.id).unwrap());
        assert!(!store.contains(&b.id));
        assert_eq!(store.len(), 1);
        assert_eq!(store.active_id(), Some(a.id.as_str()));
        assert!(store.active_messages().is_empty());

        let warnings = store.take_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains(&a.id));
    }

    #[test]
    fn test_failed_write_leaves_state_unchanged() {
        let backend = FlakyStore::default();
        let mut store = ConversationStore::open(Box::new(backend.clone())).unwrap();
        let conv = store.create_conversation(Some("safe")).unwrap();

        backend.fail_writes.store(true, Ordering::SeqCst);

        assert!(store.create_conversation(Some("lost")).is_err());
        assert_eq!(store.len(), 1);
        assert_eq!(store.active_id(), Some(conv.id.as_str()));

        assert!(store
            .append_message(&conv.id, ChatMessage::user("lost"))
            .is_err());
        assert_eq!(store.active_messages().len(), 1);

        assert!(store.delete_conversation(&conv.id).is_err());
        assert!(store.contains(&conv.id));

        backend.fail_writes.store(false, Ordering::SeqCst);
        assert_eq!(store.messages(&conv.id).unwrap().len(), 1);
    }

    #[test]
    fn test_active_id_never_dangles() {
        let (mut store, _) = open_memory();
        // Small LCG so the sequence is deterministic.
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        let mut next = move || {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (seed >> 33) as usize
        };

        for _ in 0..300 {
            match next() % 3 {
                0 => {
                    store.create_conversation(Some("x")).unwrap();
                }
                1 if !store.is_empty() => {
                    let id = store.list_conversations()[next() % store.len()].id.clone();
                    store.select_conversation(&id).unwrap();
                }
                2 if !store.is_empty() => {
                    let id = store.list_conversations()[next() % store.len()].id.clone();
                    store.delete_conversation(&id).unwrap();
                }
                _ => {
                    store.select_conversation("not-a-conversation").unwrap();
                }
            }

            match store.active_id() {
                Some(id) => assert!(store.contains(id)),
                None => assert!(store.is_empty()),
            }
        }
    }
}
