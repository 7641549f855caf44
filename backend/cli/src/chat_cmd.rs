//! `tandem chat`: run a full two-agent session, then evaluate it.

use std::sync::Arc;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tandem_agent::{
    ConversationalAgent, DialogueOrchestrator, EvaluationReport, Evaluator, ModelConfig,
};
use tandem_core::{
    CompletionProvider, HtmlExporter, JsonFileSink, ProfileStore, TranscriptEntry,
    TranscriptSink,
};
use tandem_logging::{EventLogger, SessionEvent};
use tandem_providers::{runtime, ProviderRegistry};
use tracing::{error, info};

use crate::config::Settings;
use crate::terminal_output::{note_info, note_success, note_warn, render_entry, render_report};

#[derive(Debug, Clone, clap::Args)]
pub struct ChatArgs {
    /// Profile id for party A (speaks first)
    #[arg(long)]
    pub a: String,
    /// Profile id for party B
    #[arg(long)]
    pub b: String,
    /// Number of turns (overrides session.maxTurns)
    #[arg(long)]
    pub turns: Option<u32>,
    /// Use the offline scripted provider
    #[arg(long)]
    pub mock: bool,
    /// Seed for the probing-question draw
    #[arg(long)]
    pub seed: Option<u64>,
    /// Skip the post-conversation evaluation
    #[arg(long)]
    pub no_evaluate: bool,
    /// Also export the transcript as HTML
    #[arg(long)]
    pub html: bool,
}

/// A seeded rng per seat so A and B draw different questions.
pub fn seat_rng(seed: Option<u64>, seat: u64) -> Box<dyn RngCore + Send> {
    match seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed.wrapping_add(seat))),
        None => Box::new(StdRng::from_entropy()),
    }
}

/// Resolve the configured provider, or the scripted mock with `--mock`.
pub fn select_provider(settings: &Settings, mock: bool) -> Result<Arc<dyn CompletionProvider>> {
    let spec = settings.provider_spec(mock)?;
    let registry = ProviderRegistry::from_spec(&spec)?;
    registry
        .get(spec.kind.as_str())
        .with_context(|| format!("Provider '{}' is not registered", spec.kind))
}

/// Two agents, each aware of the other, wired into an orchestrator.
pub fn build_session(
    store: &dyn ProfileStore,
    args: &ChatArgs,
    provider: Arc<dyn CompletionProvider>,
    model_config: ModelConfig,
    max_turns: u32,
) -> Result<DialogueOrchestrator> {
    let a = Arc::new(store.require(&args.a)?);
    let b = Arc::new(store.require(&args.b)?);

    let agent_a = ConversationalAgent::new(
        a.clone(),
        Some(Arc::new(b.persona.clone())),
        provider.clone(),
        seat_rng(args.seed, 0),
    )
    .with_model_config(model_config.clone());
    let agent_b = ConversationalAgent::new(
        b,
        Some(Arc::new(a.persona.clone())),
        provider,
        seat_rng(args.seed, 1),
    )
    .with_model_config(model_config);

    Ok(DialogueOrchestrator::new(agent_a, agent_b).with_max_turns(max_turns))
}

pub async fn run(settings: &Settings, store: &dyn ProfileStore, args: ChatArgs) -> Result<()> {
    let provider = select_provider(settings, args.mock)?;
    if !runtime::init(provider) {
        note_warn("Provider runtime was already initialized, reusing it");
    }
    let result = run_session(settings, store, &args).await;
    runtime::teardown();
    result
}

async fn run_session(settings: &Settings, store: &dyn ProfileStore, args: &ChatArgs) -> Result<()> {
    let provider = runtime::handle()?;
    let session_id = uuid::Uuid::new_v4().to_string();
    let max_turns = args.turns.unwrap_or_else(|| settings.max_turns());

    let mut session = build_session(store, args, provider.clone(), settings.model_config(), max_turns)?;
    info!(session_id = %session_id, provider = %provider.name(), max_turns, "Session created");
    note_info(&format!(
        "{} × {} via {} ({} turns)",
        args.a,
        args.b,
        provider.name(),
        max_turns
    ));

    let first_seat = session.participants()[0].clone();
    let sid = session_id.clone();
    session.add_observer(move |turn: u32, entry: &TranscriptEntry| {
        println!("{}", render_entry(turn, entry, entry.speaker == first_seat));
        EventLogger::log_event(
            &sid,
            SessionEvent::Utterance {
                turn,
                speaker: entry.speaker.clone(),
                content: entry.content.clone(),
            },
        );
    });

    if let Err(e) = session.run().await {
        error!(session_id = %session_id, error = %e, "Session aborted");
        EventLogger::log_event(&session_id, SessionEvent::Error { error_msg: e.to_string() });
        return Err(e).context("Conversation aborted");
    }

    if settings.persist() {
        let dir = settings.transcript_dir();
        let record = session.record(&settings.engine_tag());
        let path = JsonFileSink::new(&dir)
            .persist(&record)
            .await
            .context("Failed to save transcript")?;
        note_success(&format!("Transcript saved to {}", path.display()));
        if args.html {
            let html = HtmlExporter::new(&dir).export(&record).await?;
            note_success(&format!("HTML exported to {}", html.display()));
        }
    }

    if args.no_evaluate {
        return Ok(());
    }

    let (agent_a, agent_b) = session.agents();
    let mut evaluator =
        Evaluator::new(provider).with_temperature(settings.evaluator_temperature());
    if let Some(model) = settings.evaluator_model() {
        evaluator = evaluator.with_model(model);
    }
    let report = evaluator
        .evaluate(
            session.transcript(),
            &agent_a.profile().persona,
            &agent_b.profile().persona,
        )
        .await;
    print_report(&session_id, &report);
    Ok(())
}

fn print_report(session_id: &str, report: &EvaluationReport) {
    if report.is_fallback() {
        note_warn("Evaluation failed, showing the neutral fallback report");
    }
    println!();
    print!("{}", render_report(report));
    EventLogger::log_event(
        session_id,
        SessionEvent::Evaluation {
            total_score: report.total_score,
            values_score: report.values_score,
            verdict: report.final_verdict.clone(),
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tandem_config::TandemConfig;
    use tandem_providers::MockProvider;

    use crate::demo::demo_store;

    fn args(seed: Option<u64>) -> ChatArgs {
        ChatArgs {
            a: "alex".into(),
            b: "sarah".into(),
            turns: Some(2),
            mock: true,
            seed,
            no_evaluate: true,
            html: false,
        }
    }

    #[test]
    fn seeded_rngs_differ_per_seat() {
        let mut a = seat_rng(Some(7), 0);
        let mut b = seat_rng(Some(7), 1);
        let mut a_again = seat_rng(Some(7), 0);
        let first = a.next_u64();
        assert_eq!(first, a_again.next_u64());
        assert_ne!(first, b.next_u64());
    }

    #[test]
    fn mock_flag_selects_mock_provider() {
        let settings = Settings {
            config: tandem_config::apply_all_defaults(TandemConfig::default()),
            config_dir: PathBuf::from("/tmp"),
            config_path: PathBuf::from("/tmp/config.yaml"),
        };
        // No API key configured, so only the mock can be built.
        assert!(select_provider(&settings, false).is_err());
        assert_eq!(select_provider(&settings, true).unwrap().name(), "mock");
    }

    #[test]
    fn unknown_profile_is_rejected() {
        let store = demo_store();
        let mut bad = args(None);
        bad.b = "nobody".into();
        let provider: Arc<dyn CompletionProvider> = Arc::new(MockProvider::scripted());
        let err = build_session(&store, &bad, provider, ModelConfig::default(), 2).err().unwrap();
        assert!(err.to_string().contains("nobody"));
    }

    #[tokio::test]
    async fn demo_session_runs_offline() {
        let store = demo_store();
        let provider: Arc<dyn CompletionProvider> = Arc::new(MockProvider::scripted());
        let mut session =
            build_session(&store, &args(Some(1)), provider, ModelConfig::default(), 2).unwrap();
        let transcript = session.run().await.unwrap();
        assert_eq!(transcript.len(), 4);
        assert_eq!(session.participants(), vec!["Alex".to_string(), "Sarah".to_string()]);
    }
}
