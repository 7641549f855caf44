//! Post-conversation scoring.
//!
//! One completion call grades the finished transcript against party A's
//! own calibration answers. Evaluation never fails: any error degrades to
//! [`EvaluationReport::fallback`].

use std::fmt::Write as _;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tandem_core::{
    ChatMessage, CompletionProvider, CompletionRequest, PersonaDescription, TandemError,
    Transcript,
};
use tracing::{info, warn};

pub const DEFAULT_EVALUATOR_TEMPERATURE: f32 = 0.3;

/// Used in place of the calibration benchmark when party A has none.
pub const NO_CALIBRATION_PLACEHOLDER: &str =
    "(Party A provided no values calibration data. Judge by common sense.)";

const FALLBACK_SCORE: u8 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub interaction_score: u8,
    pub interaction_comment: String,
    pub values_score: u8,
    pub values_comment: String,
    pub chemistry_score: u8,
    pub chemistry_comment: String,
    pub total_score: u8,
    pub final_verdict: String,
    pub suggestion: String,
}

impl EvaluationReport {
    /// The neutral report returned when evaluation could not complete.
    pub fn fallback(error: impl std::fmt::Display) -> Self {
        let failed = "evaluation failed".to_string();
        Self {
            interaction_score: FALLBACK_SCORE,
            interaction_comment: failed.clone(),
            values_score: FALLBACK_SCORE,
            values_comment: failed.clone(),
            chemistry_score: FALLBACK_SCORE,
            chemistry_comment: failed,
            total_score: FALLBACK_SCORE,
            final_verdict: "evaluation error".to_string(),
            suggestion: format!("system error: {}", error),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.interaction_comment == "evaluation failed"
            && self.final_verdict == "evaluation error"
    }
}

/// What the model returned, before validation.
#[derive(Debug, Deserialize)]
struct RawReport {
    interaction_score: Option<Value>,
    #[serde(default)]
    interaction_comment: String,
    values_score: Option<Value>,
    #[serde(default)]
    values_comment: String,
    chemistry_score: Option<Value>,
    #[serde(default)]
    chemistry_comment: String,
    total_score: Option<Value>,
    #[serde(default)]
    final_verdict: String,
    #[serde(default)]
    suggestion: String,
}

/// Accepts `85`, `85.5` and `"85"`.
fn score_value(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn clamp_score(score: f64) -> u8 {
    score.round().clamp(0.0, 100.0) as u8
}

/// Remove markdown code fences the model may wrap its JSON in.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse model output into a report.
pub fn parse_report(raw: &str) -> Result<EvaluationReport, TandemError> {
    let cleaned = strip_code_fences(raw);
    // Tolerate prose around the object.
    let body = match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if start < end => &cleaned[start..=end],
        _ => cleaned.as_str(),
    };

    let parsed: RawReport = serde_json::from_str(body)
        .map_err(|e| TandemError::MalformedResponse(format!("evaluation JSON: {}", e)))?;

    let sub_score = |field: &str, value: Option<&Value>| {
        score_value(value).ok_or_else(|| {
            TandemError::MalformedResponse(format!("missing or non-numeric {}", field))
        })
    };
    let interaction = sub_score("interaction_score", parsed.interaction_score.as_ref())?;
    let values = sub_score("values_score", parsed.values_score.as_ref())?;
    let chemistry = sub_score("chemistry_score", parsed.chemistry_score.as_ref())?;

    let total = score_value(parsed.total_score.as_ref())
        .map(clamp_score)
        .unwrap_or_else(|| {
            let mean = (clamp_score(interaction) as f64
                + clamp_score(values) as f64
                + clamp_score(chemistry) as f64)
                / 3.0;
            clamp_score(mean)
        });

    Ok(EvaluationReport {
        interaction_score: clamp_score(interaction),
        interaction_comment: parsed.interaction_comment,
        values_score: clamp_score(values),
        values_comment: parsed.values_comment,
        chemistry_score: clamp_score(chemistry),
        chemistry_comment: parsed.chemistry_comment,
        total_score: total,
        final_verdict: parsed.final_verdict,
        suggestion: parsed.suggestion,
    })
}

fn guest_line(persona: &PersonaDescription) -> String {
    format!(
        "{} ({}, {}, {})",
        persona.name, persona.demographics.age, persona.demographics.job, persona.personality
    )
}

fn calibration_benchmark(persona: &PersonaDescription) -> String {
    if persona.calibration.is_empty() {
        return NO_CALIBRATION_PLACEHOLDER.to_string();
    }
    let mut block = String::from("[Party A's values benchmark]\n");
    for pair in &persona.calibration {
        let _ = writeln!(
            block,
            "- Question: {}\n  - Party A's ideal or own answer: {}",
            pair.question, pair.answer
        );
    }
    block
}

/// Build the rubric prompt for one finished conversation.
pub fn build_prompt(
    transcript: &Transcript,
    a: &PersonaDescription,
    b: &PersonaDescription,
) -> String {
    format!(
        r#"You are an extremely strict, sharp-eyed expert in relationships and communication.
Based on the chat log below, judge whether these two people are truly a good fit.

[Guests]
Party A (user): {guest_a}
Party B (candidate): {guest_b}

{benchmark}

[Chat log]
{dialogue}
[Dimensions]
Score each of the following from 0 to 100 and explain why:

1. **Interaction Quality**:
   - Did both sides start topics?
   - Were reply lengths balanced?
   - Was one side eager while the other brushed them off (only "mm-hm", "haha")?

2. **Values Alignment** (core dimension):
   - Check closely whether Party B's answers to Party A's probing questions match Party A's values benchmark.
   - If the benchmark says "hates lateness" and Party B comes across as casual about it, this score must be below 50.
   - If Party B answered and their view closely matches Party A's, score higher.

3. **Chemistry**:
   - Any clear flirting, compliments or resonance?
   - Was the tone relaxed and happy?

[Verdict]
Combine the scores into a total score.
- If values (dimension 2) seriously conflict, the total must not exceed 60 (veto).
- Only give a high score when values match and the two clearly get along.

Reply with JSON only, in exactly this shape:
{{
    "interaction_score": 0,
    "interaction_comment": "...",
    "values_score": 0,
    "values_comment": "...",
    "chemistry_score": 0,
    "chemistry_comment": "...",
    "total_score": 0,
    "final_verdict": "...",
    "suggestion": "..."
}}
"#,
        guest_a = guest_line(a),
        guest_b = guest_line(b),
        benchmark = calibration_benchmark(a),
        dialogue = transcript.render(),
    )
}

/// Scores finished conversations with a single completion call.
pub struct Evaluator {
    provider: Arc<dyn CompletionProvider>,
    model: Option<String>,
    temperature: f32,
}

impl Evaluator {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            model: None,
            temperature: DEFAULT_EVALUATOR_TEMPERATURE,
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

    pub async fn evaluate(
        &self,
        transcript: &Transcript,
        a: &PersonaDescription,
        b: &PersonaDescription,
    ) -> EvaluationReport {
        match self.try_evaluate(transcript, a, b).await {
            Ok(report) => {
                info!(
                    total = report.total_score,
                    values = report.values_score,
                    "Evaluation complete"
                );
                report
            }
            Err(e) => {
                warn!(error = %e, "Evaluation failed, using fallback report");
                EvaluationReport::fallback(e)
            }
        }
    }

    async fn try_evaluate(
        &self,
        transcript: &Transcript,
        a: &PersonaDescription,
        b: &PersonaDescription,
    ) -> Result<EvaluationReport, TandemError> {
        let prompt = build_prompt(transcript, a, b);
        let mut request = CompletionRequest::new(vec![ChatMessage::user(prompt)])
            .with_temperature(self.temperature);
        if let Some(model) = &self.model {
            request = request.with_model(model.clone());
        }

        let response = self
            .provider
            .complete(&request)
            .await
            .map_err(|e| TandemError::Provider {
                provider: self.provider.name().to_string(),
                message: format!("{:#}", e),
            })?;

        parse_report(&response.text())
    }
}
