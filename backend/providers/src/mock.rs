use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use tandem_core::{ChatRole, CompletionProvider, CompletionRequest, CompletionResponse};

const SMALL_TALK: &[&str] = &[
    "That's an interesting take, can you tell me more?",
    "Haha, fair enough. What do you usually do on weekends?",
    "I'm really curious about that too!",
    "I feel like we could get along well.",
];

enum Mode {
    /// Keyword-driven canned dialogue for offline demos.
    Scripted,
    /// Always the same reply.
    Fixed(String),
    /// Pop replies in order, then fall back to a default.
    Queue(Mutex<VecDeque<String>>),
    /// Every call fails with this message.
    Failing(String),
}

/// A mock completion provider that returns canned responses and records
/// every request it receives.
pub struct MockProvider {
    name: String,
    mode: Mode,
    small_talk_cursor: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockProvider {
    fn with_mode(name: impl Into<String>, mode: Mode) -> Self {
        Self {
            name: name.into(),
            mode,
            small_talk_cursor: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn scripted() -> Self {
        Self::with_mode("mock", Mode::Scripted)
    }

    pub fn fixed(response: impl Into<String>) -> Self {
        Self::with_mode("mock", Mode::Fixed(response.into()))
    }

    pub fn queue<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue = responses.into_iter().map(Into::into).collect();
        Self::with_mode("mock", Mode::Queue(Mutex::new(queue)))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_mode("mock", Mode::Failing(message.into()))
    }

    /// Snapshot of every request received so far.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn scripted_reply(&self, request: &CompletionRequest) -> String {
        let last = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role != ChatRole::System)
            .map(|m| m.content.to_lowercase());

        let Some(last) = last else {
            return "Hi! Nice to meet you.".to_string();
        };

        let words: Vec<&str> = last
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let has = |needles: &[&str]| needles.iter().any(|n| words.contains(n));

        if has(&["bye", "goodbye"]) {
            "Sounds good, talk soon! Have a lovely day.".to_string()
        } else if has(&["hello", "hi", "hey"]) {
            "Hey! Are you on here looking for someone too? Your profile looks fun.".to_string()
        } else if has(&["interest", "interests", "hobby", "hobbies"]) {
            "I like that too! Have you read or watched anything good lately?".to_string()
        } else if has(&["movie", "movies", "film", "films"]) {
            "Sci-fi is my favourite, especially Interstellar. What about you?".to_string()
        } else if has(&["rust", "programming", "coding"]) {
            "Wow, a tech wizard! I'm learning Python, it's fun but kind of hard.".to_string()
        } else {
            let i = self.small_talk_cursor.fetch_add(1, Ordering::Relaxed);
            SMALL_TALK[i % SMALL_TALK.len()].to_string()
        }
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let text = match &self.mode {
            Mode::Scripted => self.scripted_reply(request),
            Mode::Fixed(response) => response.clone(),
            Mode::Queue(queue) => queue
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .pop_front()
                .unwrap_or_else(|| "No more mock responses".to_string()),
            Mode::Failing(message) => anyhow::bail!("{}", message),
        };

        Ok(CompletionResponse::from_text(self.name.clone(), "mock", text))
    }
}
