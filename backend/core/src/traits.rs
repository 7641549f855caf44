use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;

/// Trait for hosted chat-completion backends.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name (e.g., "openai", "ollama").
    fn name(&self) -> &str;

    /// Send an ordered message list and wait for the full response.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;
}

/// Request to a completion provider.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Overrides the provider's configured model when set.
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            model: None,
            messages,
            max_tokens: 1024,
            temperature: 0.7,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// One block of a provider response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    Thinking { thinking: String },
}

/// Response from a completion provider.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: Vec<ContentBlock>,
    pub provider: String,
    pub model: String,
    pub tokens_used: u64,
    pub latency_ms: u64,
}

impl CompletionResponse {
    /// A response holding a single text block.
    pub fn from_text(
        provider: impl Into<String>,
        model: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            provider: provider.into(),
            model: model.into(),
            tokens_used: 0,
            latency_ms: 0,
        }
    }

    /// Concatenation of every text block; thinking blocks are dropped.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Thinking { .. } => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_skips_thinking_blocks() {
        let response = CompletionResponse {
            content: vec![
                ContentBlock::Thinking {
                    thinking: "she seems nice".into(),
                },
                ContentBlock::Text { text: "Hi! ".into() },
                ContentBlock::Text {
                    text: "How was your day?".into(),
                },
            ],
            provider: "mock".into(),
            model: "mock".into(),
            tokens_used: 0,
            latency_ms: 0,
        };
        assert_eq!(response.text(), "Hi! How was your day?");
    }

    #[test]
    fn test_content_block_tagging() {
        let block: ContentBlock =
            serde_json::from_str(r#"{"type":"thinking","thinking":"hmm"}"#).unwrap();
        assert_eq!(
            block,
            ContentBlock::Thinking {
                thinking: "hmm".into()
            }
        );
    }
}
