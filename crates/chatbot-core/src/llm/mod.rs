mod traits;
mod openai;

pub use traits::*;
pub use openai::{OpenAIClient, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
