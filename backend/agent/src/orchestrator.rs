//! Drives alternating turns between two agents.

use std::path::PathBuf;

use anyhow::Result;
use tandem_core::{SessionRecord, TandemError, Transcript, TranscriptEntry, TranscriptSink};
use tracing::{info, instrument};

use crate::agent_loop::ConversationalAgent;

pub const DEFAULT_MAX_TURNS: u32 = 8;

/// Synthetic message that opens every session.
pub const SESSION_OPENER: &str = "The conversation starts now. Say hello.";

/// Notified of every entry appended to the transcript.
pub trait TranscriptObserver: Send + Sync {
    fn on_entry(&self, turn: u32, entry: &TranscriptEntry);
}

impl<F> TranscriptObserver for F
where
    F: Fn(u32, &TranscriptEntry) + Send + Sync,
{
    fn on_entry(&self, turn: u32, entry: &TranscriptEntry) {
        self(turn, entry)
    }
}

/// Runs a fixed number of turns. Each turn is A then B; no early exit.
pub struct DialogueOrchestrator {
    a: ConversationalAgent,
    b: ConversationalAgent,
    transcript: Transcript,
    max_turns: u32,
    completed_turns: u32,
    observers: Vec<Box<dyn TranscriptObserver>>,
}

impl DialogueOrchestrator {
    pub fn new(a: ConversationalAgent, b: ConversationalAgent) -> Self {
        Self {
            a,
            b,
            transcript: Transcript::new(),
            max_turns: DEFAULT_MAX_TURNS,
            completed_turns: 0,
            observers: Vec::new(),
        }
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn add_observer(&mut self, observer: impl TranscriptObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn completed_turns(&self) -> u32 {
        self.completed_turns
    }

    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    pub fn participants(&self) -> Vec<String> {
        vec![self.a.name().to_string(), self.b.name().to_string()]
    }

    pub fn agents(&self) -> (&ConversationalAgent, &ConversationalAgent) {
        (&self.a, &self.b)
    }

    /// Run one turn: A replies to the seed, B replies to A.
    #[instrument(skip(self), fields(turn = self.completed_turns + 1))]
    pub async fn run_turn(&mut self) -> Result<(), TandemError> {
        let turn = self.completed_turns + 1;
        // Every turn advances, the first included: orchestrator turn t
        // runs with agent prompts built for turn t + 1.
        self.a.advance();
        self.b.advance();

        let seed = match self.transcript.last() {
            Some(last) => last.clone(),
            None => TranscriptEntry::system(SESSION_OPENER),
        };

        let from_a = self.a.reply(Some(&seed)).await?;
        self.append(turn, from_a.clone());

        let from_b = self.b.reply(Some(&from_a)).await?;
        self.append(turn, from_b);

        self.completed_turns = turn;
        Ok(())
    }

    /// Run the remaining turns up to the configured maximum.
    pub async fn run(&mut self) -> Result<&Transcript, TandemError> {
        info!(
            a = %self.a.name(),
            b = %self.b.name(),
            max_turns = self.max_turns,
            "Starting dialogue"
        );
        while self.completed_turns < self.max_turns {
            self.run_turn().await?;
        }
        info!(entries = self.transcript.len(), "Dialogue finished");
        Ok(&self.transcript)
    }

    fn append(&mut self, turn: u32, entry: TranscriptEntry) {
        for observer in &self.observers {
            observer.on_entry(turn, &entry);
        }
        self.transcript.push(entry);
    }

    pub fn record(&self, engine: &str) -> SessionRecord {
        SessionRecord::new(self.participants(), self.transcript.clone(), engine)
    }

    /// Hand the finished session to a sink.
    pub async fn persist(&self, sink: &dyn TranscriptSink, engine: &str) -> Result<PathBuf> {
        sink.persist(&self.record(engine)).await
    }
}
