use std::sync::Arc;
use std::time::Duration;

use futures::future::{AbortHandle, AbortRegistration, Abortable, BoxFuture, FutureExt};
use tracing::{debug, info, warn};

use crate::conversation::{ChatMessage, Conversation, ConversationStore};
use crate::error::{ChatError, Result};
use crate::llm::{LlmClient, Message};

/// Assistant message written when a completion request fails.
pub const ASSISTANT_UNAVAILABLE: &str = "Could not reach the assistant. Try again.";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Upper bound on a single completion request.
    pub timeout: Duration,
    /// Send the whole conversation instead of only the latest user message.
    pub include_history: bool,
    /// When nothing is active, the first message creates a conversation.
    /// With this set it is also sent; otherwise it is only stored.
    pub reply_to_first_message: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
            include_history: false,
            reply_to_first_message: true,
        }
    }
}

/// Result of submitting the pending input.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Input was empty after trimming; nothing changed.
    Ignored,
    /// A request is already in flight; nothing changed.
    Busy,
    /// There was no active conversation, so one was created with the input
    /// as its first message. Only returned when
    /// [`SessionOptions::reply_to_first_message`] is off; no request is sent.
    Created(Conversation),
    /// The user message was stored and a request must now be run.
    Dispatched(CompletionTicket),
}

/// A completion request that has been prepared but not yet run.
#[derive(Debug)]
pub struct CompletionTicket {
    request_id: u64,
    conversation_id: String,
    messages: Vec<Message>,
    registration: AbortRegistration,
}

impl CompletionTicket {
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Messages that will be sent to the model.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

/// What came back from a completion request, to be fed to
/// [`SessionController::apply_reply`].
#[derive(Debug)]
pub struct CompletionReply {
    request_id: u64,
    pub conversation_id: String,
    pub result: std::result::Result<String, ChatError>,
}

#[derive(Debug)]
pub enum ApplyOutcome {
    /// The assistant reply was appended.
    Answered(Vec<ChatMessage>),
    /// The request failed and the unavailable notice was appended instead.
    Failed {
        messages: Vec<ChatMessage>,
        error: ChatError,
    },
    /// The reply belongs to a request that was cancelled; nothing changed.
    Discarded,
}

#[derive(Debug)]
pub enum SendOutcome {
    Ignored,
    Busy,
    Created(Conversation),
    Completed(ApplyOutcome),
}

#[derive(Debug)]
struct PendingRequest {
    request_id: u64,
    conversation_id: String,
    abort: AbortHandle,
}

/// Drives the send cycle for the active conversation.
///
/// A send is split in three steps so a UI can stay responsive while the
/// request runs: [`submit`](Self::submit) stores the user message and hands
/// out a ticket, [`dispatch`](Self::dispatch) turns the ticket into a future
/// that can be awaited anywhere, and [`apply_reply`](Self::apply_reply)
/// stores the answer. [`send`](Self::send) runs all three in place.
pub struct SessionController {
    store: ConversationStore,
    llm: Arc<dyn LlmClient>,
    options: SessionOptions,
    input: String,
    pending: Option<PendingRequest>,
    next_request_id: u64,
}

impl SessionController {
    pub fn new(store: ConversationStore, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            store,
            llm,
            options: SessionOptions::default(),
            input: String::new(),
            pending: None,
            next_request_id: 0,
        }
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    pub fn insert_emoji(&mut self, glyph: &str) {
        self.input.push_str(glyph);
    }

    /// True while a completion request is outstanding.
    pub fn is_typing(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_conversation_id(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.conversation_id.as_str())
    }

    /// Validate and store the pending input. See [`SubmitOutcome`].
    pub fn submit(&mut self) -> Result<SubmitOutcome> {
        if self.pending.is_some() {
            debug!("submit rejected while a request is in flight");
            return Ok(SubmitOutcome::Busy);
        }

        let text = self.input.trim().to_string();
        if text.is_empty() {
            return Ok(SubmitOutcome::Ignored);
        }

        let (conversation_id, history) = match self.store.active_id().map(str::to_string) {
            Some(id) => {
                let history = self.store.append_message(&id, ChatMessage::user(&text))?;
                (id, history)
            }
            None => {
                let conversation = self.store.create_conversation(Some(&text))?;
                if !self.options.reply_to_first_message {
                    self.input.clear();
                    return Ok(SubmitOutcome::Created(conversation));
                }
                (conversation.id, conversation.messages)
            }
        };
        self.input.clear();

        // Single-turn by default: the model only sees the message just sent.
        let messages = if self.options.include_history {
            history.iter().map(ChatMessage::to_llm_message).collect()
        } else {
            vec![Message::user(text)]
        };

        let (abort, registration) = AbortHandle::new_pair();
        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.pending = Some(PendingRequest {
            request_id,
            conversation_id: conversation_id.clone(),
            abort,
        });

        info!(
            conversation = %conversation_id,
            request_id,
            messages = messages.len(),
            "dispatching completion request"
        );
        Ok(SubmitOutcome::Dispatched(CompletionTicket {
            request_id,
            conversation_id,
            messages,
            registration,
        }))
    }

    /// Build the request future for a ticket. It resolves with
    /// [`ChatError::Cancelled`] if the request is aborted and
    /// [`ChatError::Timeout`] if it outlives the configured timeout.
    pub fn dispatch(&self, ticket: CompletionTicket) -> BoxFuture<'static, CompletionReply> {
        let llm = Arc::clone(&self.llm);
        let timeout = self.options.timeout;

        async move {
            let CompletionTicket {
                request_id,
                conversation_id,
                messages,
                registration,
            } = ticket;

            let request = tokio::time::timeout(timeout, llm.chat(&messages));
            let result = match Abortable::new(request, registration).await {
                Err(_aborted) => Err(ChatError::Cancelled),
                Ok(Err(_elapsed)) => Err(ChatError::Timeout(timeout.as_secs())),
                Ok(Ok(Err(e))) => Err(e),
                Ok(Ok(Ok(response))) => Ok(response.message.content),
            };

            CompletionReply {
                request_id,
                conversation_id,
                result,
            }
        }
        .boxed()
    }

    /// Store the outcome of a request and clear the typing indicator.
    pub fn apply_reply(&mut self, reply: CompletionReply) -> Result<ApplyOutcome> {
        let current = matches!(&self.pending, Some(p) if p.request_id == reply.request_id);
        if !current {
            debug!(
                conversation = %reply.conversation_id,
                request_id = reply.request_id,
                "discarding reply to a cancelled request"
            );
            return Ok(ApplyOutcome::Discarded);
        }
        self.pending = None;

        match reply.result {
            Ok(text) => {
                let messages = self
                    .store
                    .append_message(&reply.conversation_id, ChatMessage::assistant(text))?;
                Ok(ApplyOutcome::Answered(messages))
            }
            Err(error) => {
                warn!(conversation = %reply.conversation_id, error = %error, "completion request failed");
                let messages = self.store.append_message(
                    &reply.conversation_id,
                    ChatMessage::assistant(ASSISTANT_UNAVAILABLE),
                )?;
                Ok(ApplyOutcome::Failed { messages, error })
            }
        }
    }

    /// Submit, run the request and apply its reply.
    pub async fn send(&mut self) -> Result<SendOutcome> {
        match self.submit()? {
            SubmitOutcome::Ignored => Ok(SendOutcome::Ignored),
            SubmitOutcome::Busy => Ok(SendOutcome::Busy),
            SubmitOutcome::Created(conversation) => Ok(SendOutcome::Created(conversation)),
            SubmitOutcome::Dispatched(ticket) => {
                let reply = self.dispatch(ticket).await;
                self.apply_reply(reply).map(SendOutcome::Completed)
            }
        }
    }

    /// Abort the in-flight request, if any. Its reply will be discarded.
    pub fn cancel_pending(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                pending.abort.abort();
                info!(
                    conversation = %pending.conversation_id,
                    request_id = pending.request_id,
                    "cancelled completion request"
                );
                true
            }
            None => false,
        }
    }

    /// Create an empty conversation and make it active. The in-flight
    /// request is cancelled only once the new conversation exists.
    pub fn new_conversation(&mut self) -> Result<Conversation> {
        let conversation = self.store.create_conversation(None)?;
        self.cancel_pending();
        Ok(conversation)
    }

    /// Switch to another conversation. A request for the conversation being
    /// left is cancelled once the switch has happened.
    pub fn select_conversation(&mut self, id: &str) -> Result<bool> {
        let leaving = self.pending_conversation_id().is_some_and(|p| p != id);
        let selected = self.store.select_conversation(id)?;
        if selected && leaving {
            self.cancel_pending();
        }
        Ok(selected)
    }

    /// Delete a conversation, cancelling any request that targets it.
    pub fn delete_conversation(&mut self, id: &str) -> Result<bool> {
        let deleted = self.store.delete_conversation(id)?;
        if deleted && self.pending_conversation_id() == Some(id) {
            self.cancel_pending();
        }
        Ok(deleted)
    }

    /// Drain warnings queued by the store, such as unreadable message lists.
    pub fn take_warnings(&mut self) -> Vec<String> {
        self.store.take_warnings()
    }
}
