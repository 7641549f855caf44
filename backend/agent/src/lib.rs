//! Tandem Agent Runner
//!
//! Persona prompts, match scoring, the two-agent dialogue loop and the
//! post-conversation evaluator.

pub mod agent_loop;
pub mod evaluator;
pub mod match_score;
pub mod orchestrator;
pub mod session_state;
pub mod system_prompt;

pub use agent_loop::ConversationalAgent;
pub use evaluator::{EvaluationReport, Evaluator};
pub use match_score::{MatchScorer, ScoreBreakdown};
pub use orchestrator::{DialogueOrchestrator, TranscriptObserver, DEFAULT_MAX_TURNS};
pub use session_state::{AgentState, ModelConfig};
pub use system_prompt::{Attitude, PersonaPromptBuilder, Phase};
