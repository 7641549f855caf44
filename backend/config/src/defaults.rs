//! Config defaults: applies default values to parsed config.

use crate::schema::{EvaluatorConfig, LoggingConfig, ProviderConfig, SessionConfig, TandemConfig};

pub const DEFAULT_PROVIDER_KIND: &str = "openai";
pub const DEFAULT_BASE_URL: &str = "https://api.moonshot.cn/v1";
pub const DEFAULT_MODEL: &str = "moonshot-v1-8k";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub const DEFAULT_MAX_TURNS: u32 = 8;
pub const DEFAULT_TRANSCRIPT_DIR: &str = "logs";
pub const DEFAULT_ENGINE_TAG: &str = "tandem";

pub const DEFAULT_EVALUATOR_TEMPERATURE: f32 = 0.3;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: TandemConfig) -> TandemConfig {
    let config = apply_provider_defaults(config);
    let config = apply_session_defaults(config);
    let config = apply_evaluator_defaults(config);
    apply_logging_defaults(config)
}

fn apply_provider_defaults(mut config: TandemConfig) -> TandemConfig {
    let provider = config.provider.get_or_insert_with(ProviderConfig::default);
    let kind = provider
        .kind
        .get_or_insert_with(|| DEFAULT_PROVIDER_KIND.to_string())
        .clone();
    // The mock needs neither.
    let (base_url, model) = match kind.as_str() {
        "mock" => (None, None),
        "ollama" => (Some(DEFAULT_OLLAMA_BASE_URL), Some(DEFAULT_OLLAMA_MODEL)),
        _ => (Some(DEFAULT_BASE_URL), Some(DEFAULT_MODEL)),
    };
    if let Some(url) = base_url {
        provider.base_url.get_or_insert_with(|| url.to_string());
    }
    if let Some(model) = model {
        provider.model.get_or_insert_with(|| model.to_string());
    }
    provider.temperature.get_or_insert(DEFAULT_TEMPERATURE);
    provider.max_tokens.get_or_insert(DEFAULT_MAX_TOKENS);
    provider.timeout_secs.get_or_insert(DEFAULT_TIMEOUT_SECS);
    config
}

fn apply_session_defaults(mut config: TandemConfig) -> TandemConfig {
    let session = config.session.get_or_insert_with(SessionConfig::default);
    session.max_turns.get_or_insert(DEFAULT_MAX_TURNS);
    session
        .transcript_dir
        .get_or_insert_with(|| DEFAULT_TRANSCRIPT_DIR.to_string());
    session
        .engine_tag
        .get_or_insert_with(|| DEFAULT_ENGINE_TAG.to_string());
    session.persist.get_or_insert(true);
    config
}

fn apply_evaluator_defaults(mut config: TandemConfig) -> TandemConfig {
    let evaluator = config.evaluator.get_or_insert_with(EvaluatorConfig::default);
    evaluator.temperature.get_or_insert(DEFAULT_EVALUATOR_TEMPERATURE);
    config
}

/// Ensure logging level is set. The directory default depends on the
/// config dir and is resolved by the caller.
fn apply_logging_defaults(mut config: TandemConfig) -> TandemConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    config
}
