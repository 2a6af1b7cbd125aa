mod controller;

pub use controller::{
    ApplyOutcome, CompletionReply, CompletionTicket, SendOutcome, SessionController,
    SessionOptions, SubmitOutcome, ASSISTANT_UNAVAILABLE, DEFAULT_REQUEST_TIMEOUT,
};
