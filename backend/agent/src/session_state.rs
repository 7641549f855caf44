//! Per-agent conversation state.

use std::sync::Arc;

use tandem_core::{ChatMessage, ChatRole, PersonaDescription, TranscriptEntry};

/// Sampling settings applied to every reply request.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Overrides the provider's default model when set.
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

/// Mutable state of one agent for the lifetime of one session.
#[derive(Debug, Clone)]
pub struct AgentState {
    /// Starts at 1 and grows by one every time the prompt is rebuilt.
    pub turn: u32,
    pub counterpart: Option<Arc<PersonaDescription>>,
    /// Local view of the shared transcript in provider format.
    pub history: Vec<ChatMessage>,
    pub system_prompt: String,
}

impl AgentState {
    pub fn new(counterpart: Option<Arc<PersonaDescription>>) -> Self {
        Self {
            turn: 1,
            counterpart,
            history: Vec::new(),
            system_prompt: String::new(),
        }
    }

    /// Append an utterance, mapping its speaker to a provider role.
    pub fn record(&mut self, entry: &TranscriptEntry, own_name: &str) {
        let role = if entry.is_system() {
            ChatRole::System
        } else if entry.speaker == own_name {
            ChatRole::Assistant
        } else {
            ChatRole::User
        };
        self.history.push(ChatMessage::new(role, entry.content.clone()));
    }

    /// Full provider message list: fresh system prompt, then history.
    pub fn messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.history.len() + 1);
        messages.push(ChatMessage::system(self.system_prompt.clone()));
        messages.extend(self.history.iter().cloned());
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_mapping() {
        let mut state = AgentState::new(None);
        state.record(&TranscriptEntry::system("conversation starts now"), "Alex");
        state.record(&TranscriptEntry::new("Alex", "Hi!"), "Alex");
        state.record(&TranscriptEntry::new("Sarah", "Hey"), "Alex");

        let roles: Vec<ChatRole> = state.history.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::System, ChatRole::Assistant, ChatRole::User]);
    }

    #[test]
    fn test_messages_lead_with_system_prompt() {
        let mut state = AgentState::new(None);
        state.system_prompt = "You are Alex".into();
        state.record(&TranscriptEntry::new("Sarah", "Hey"), "Alex");
        let messages = state.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ChatMessage::system("You are Alex"));
        assert_eq!(messages[1], ChatMessage::user("Hey"));
        assert_eq!(state.turn, 1);
    }
}
