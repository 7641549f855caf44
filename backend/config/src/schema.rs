//! Tandem runtime configuration schema.
//!
//! Every field is optional on disk; `defaults::apply_all_defaults` fills in
//! what the file leaves out.

use serde::{Deserialize, Serialize};

/// Root configuration for Tandem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TandemConfig {
    /// Chat-completion backend used by both agents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderConfig>,

    /// Conversation session settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionConfig>,

    /// Post-conversation evaluator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluator: Option<EvaluatorConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// `openai`, `ollama` or `mock`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Usually `${MOONSHOT_API_KEY}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_turns: Option<u32>,
    /// Where finished transcripts are written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_dir: Option<String>,
    /// Recorded as `engine` in every saved transcript
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persist: Option<bool>,
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatorConfig {
    /// Overrides `provider.model` for the scoring call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_yaml() {
        let yaml = r#"
provider:
  kind: openai
  baseUrl: https://api.moonshot.cn/v1
  apiKey: sk-test
  maxTokens: 512
session:
  maxTurns: 4
  transcriptDir: out
evaluator:
  temperature: 0.2
"#;
        let config: TandemConfig = serde_yaml::from_str(yaml).unwrap();
        let provider = config.provider.unwrap();
        assert_eq!(provider.kind.as_deref(), Some("openai"));
        assert_eq!(provider.max_tokens, Some(512));
        assert_eq!(config.session.unwrap().max_turns, Some(4));
        assert_eq!(config.evaluator.unwrap().temperature, Some(0.2));
        assert!(config.logging.is_none());
    }

    #[test]
    fn empty_sections_are_omitted() {
        let yaml = serde_yaml::to_string(&TandemConfig::default()).unwrap();
        assert_eq!(yaml.trim(), "{}");
    }
}
