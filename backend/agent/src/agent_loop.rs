//! A persona-driven conversational agent.

use std::sync::Arc;

use rand::RngCore;
use tandem_core::{
    CompletionProvider, CompletionRequest, PersonaDescription, Profile, TandemError,
    TranscriptEntry,
};
use tracing::{debug, info, instrument};

use crate::session_state::{AgentState, ModelConfig};
use crate::system_prompt::PersonaPromptBuilder;

/// Wraps a persona, its view of the counterpart, and a rolling history.
pub struct ConversationalAgent {
    profile: Arc<Profile>,
    state: AgentState,
    provider: Arc<dyn CompletionProvider>,
    model_config: ModelConfig,
    rng: Box<dyn RngCore + Send>,
}

impl ConversationalAgent {
    /// Create an agent at turn 1 with its first prompt already built.
    pub fn new(
        profile: Arc<Profile>,
        counterpart: Option<Arc<PersonaDescription>>,
        provider: Arc<dyn CompletionProvider>,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        let mut agent = Self {
            profile,
            state: AgentState::new(counterpart),
            provider,
            model_config: ModelConfig::default(),
            rng,
        };
        agent.rebuild_prompt();
        agent
    }

    pub fn with_model_config(mut self, model_config: ModelConfig) -> Self {
        self.model_config = model_config;
        self
    }

    pub fn name(&self) -> &str {
        self.profile.name()
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn turn(&self) -> u32 {
        self.state.turn
    }

    pub fn system_prompt(&self) -> &str {
        &self.state.system_prompt
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    /// Move to the next turn and regenerate the system prompt for it.
    pub fn advance(&mut self) {
        self.state.turn += 1;
        self.rebuild_prompt();
        debug!(agent = %self.profile.name(), turn = self.state.turn, "Advanced agent");
    }

    fn rebuild_prompt(&mut self) {
        let builder =
            PersonaPromptBuilder::new(&self.profile.persona, self.profile.preferences.as_ref());
        self.state.system_prompt = builder.build(
            self.state.turn,
            self.state.counterpart.as_deref(),
            &mut *self.rng,
        );
    }

    /// Produce the next utterance. Provider failures propagate unchanged in
    /// substance; nothing is retried here.
    #[instrument(skip_all, fields(agent = %self.profile.name(), turn = self.state.turn))]
    pub async fn reply(
        &mut self,
        incoming: Option<&TranscriptEntry>,
    ) -> Result<TranscriptEntry, TandemError> {
        if let Some(entry) = incoming {
            self.state.record(entry, self.profile.name());
        }

        let mut request = CompletionRequest::new(self.state.messages())
            .with_max_tokens(self.model_config.max_tokens)
            .with_temperature(self.model_config.temperature);
        if let Some(model) = &self.model_config.model {
            request = request.with_model(model.clone());
        }

        debug!(messages = request.messages.len(), "Requesting reply");
        let response =
            self.provider
                .complete(&request)
                .await
                .map_err(|e| TandemError::Provider {
                    provider: self.provider.name().to_string(),
                    message: format!("{:#}", e),
                })?;

        let text = response.text();
        info!(
            provider = %response.provider,
            latency_ms = response.latency_ms,
            tokens = response.tokens_used,
            "Agent replied"
        );

        let entry = TranscriptEntry::new(self.profile.name(), text);
        self.state.record(&entry, self.profile.name());
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tandem_core::{ChatRole, Demographics, LooseInt};
    use tandem_providers::MockProvider;

    fn profile(id: &str, name: &str) -> Arc<Profile> {
        let demographics = Demographics {
            age: LooseInt::from(25_i64),
            job: "tester".into(),
            location: "Hangzhou".into(),
            ..Default::default()
        };
        Arc::new(Profile::new(
            PersonaDescription::new(id, name, demographics, "ENFJ"),
            None,
        ))
    }

    fn agent(provider: Arc<MockProvider>) -> ConversationalAgent {
        ConversationalAgent::new(
            profile("a", "Alex"),
            Some(Arc::new(profile("b", "Sarah").persona.clone())),
            provider,
            Box::new(StdRng::seed_from_u64(7)),
        )
    }

    #[tokio::test]
    async fn test_reply_records_history() {
        let provider = Arc::new(MockProvider::queue(["Hi Sarah!", "I love hiking."]));
        let mut alex = agent(provider.clone());
        assert_eq!(alex.turn(), 1);
        assert!(alex.system_prompt().contains("- Name: Sarah"));

        let first = alex
            .reply(Some(&TranscriptEntry::system("conversation starts now")))
            .await
            .unwrap();
        assert_eq!(first, TranscriptEntry::new("Alex", "Hi Sarah!"));

        let second = alex
            .reply(Some(&TranscriptEntry::new("Sarah", "What do you do for fun?")))
            .await
            .unwrap();
        assert_eq!(second.content, "I love hiking.");

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        let roles: Vec<ChatRole> = requests[1].messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                ChatRole::System,
                ChatRole::System,
                ChatRole::Assistant,
                ChatRole::User
            ]
        );
        assert_eq!(alex.state().history.len(), 4);
    }

    #[tokio::test]
    async fn test_advance_rebuilds_prompt() {
        let provider = Arc::new(MockProvider::fixed("ok"));
        let mut alex = agent(provider.clone());
        assert!(alex.system_prompt().contains("Icebreaker"));
        alex.advance();
        alex.advance();
        assert_eq!(alex.turn(), 3);
        assert!(alex.system_prompt().contains("Value Probing"));

        alex.reply(None).await.unwrap();
        let sent = &provider.requests()[0].messages[0];
        assert_eq!(sent.role, ChatRole::System);
        assert!(sent.content.contains("Value Probing"));
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = Arc::new(MockProvider::failing("401 unauthorized"));
        let mut alex = agent(provider);
        let err = alex.reply(None).await.unwrap_err();
        match err {
            TandemError::Provider { provider, message } => {
                assert_eq!(provider, "mock");
                assert!(message.contains("401"));
            }
            other => panic!("unexpected error: {other}"),
        }
        // A failed reply leaves nothing in history.
        assert!(alex.state().history.is_empty());
    }
}
