use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::error::ChatError;
use crate::llm::{LlmClient, OpenAIClient, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use crate::session::SessionOptions;

pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub chat: ChatSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub model: String,
    pub api_key_env: String,
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// Send the whole conversation with each request. Off by default, so the
    /// model only ever sees the latest user message.
    pub include_history: bool,
    /// Answer the message that implicitly creates a conversation. When off,
    /// that first message is only stored.
    pub reply_to_first_message: bool,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            include_history: false,
            reply_to_first_message: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Where conversations are kept. Defaults to the platform data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            base_url: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chatbot")
            .join("config.toml")
    }

    /// Load from the default config path, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load from `path`. A missing or unparsable file yields defaults.
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config"),
                },
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not read config"),
            }
        }
        Self::default()
    }

    pub fn save(&self) -> Result<(), ChatError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ChatError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ChatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the API key from the environment variable named in settings.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.llm.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.storage.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("chatbot")
                .join("conversations")
        })
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            timeout: Duration::from_secs(self.llm.timeout_secs.max(1)),
            include_history: self.chat.include_history,
            reply_to_first_message: self.chat.reply_to_first_message,
        }
    }

    /// Build the completion client. Fails when no API key is available.
    pub fn build_llm_client(&self) -> Result<Arc<dyn LlmClient>, ChatError> {
        let api_key = self.api_key().ok_or_else(|| {
            ChatError::Config(format!(
                "No API key found: set the {} environment variable",
                self.llm.api_key_env
            ))
        })?;

        let mut client = OpenAIClient::new(api_key)
            .with_model(&self.llm.model)
            .with_max_tokens(self.llm.max_tokens);
        if let Some(ref base_url) = self.llm.base_url {
            client = client.with_base_url(base_url);
        }
        Ok(Arc::new(client))
    }
}
