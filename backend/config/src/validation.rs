//! Config validation with user-friendly error messages.

use crate::schema::TandemConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &TandemConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_provider(config, &mut report);
    validate_session(config, &mut report);
    validate_evaluator(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn check_temperature(path: &str, temperature: Option<f32>, report: &mut ValidationReport) {
    if let Some(t) = temperature {
        if !(0.0..=2.0).contains(&t) {
            report.error(path, format!("temperature {t} is outside [0, 2]"));
        }
    }
}

fn validate_provider(config: &TandemConfig, report: &mut ValidationReport) {
    let Some(provider) = &config.provider else { return };
    let kind = provider.kind.as_deref().unwrap_or("openai");
    let known = matches!(kind, "openai" | "moonshot" | "kimi" | "ollama" | "mock");
    if !known {
        report.error(
            "provider.kind",
            format!("Unknown provider kind '{kind}'. Use 'openai', 'ollama', or 'mock'"),
        );
    }

    if kind != "mock" {
        let base_url = provider.base_url.as_deref().unwrap_or("");
        if base_url.trim().is_empty() {
            report.error("provider.baseUrl", "Non-mock providers need a baseUrl");
        }
    }

    if matches!(kind, "openai" | "moonshot" | "kimi") {
        let has_key = provider
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty());
        if !has_key {
            report.warn(
                "provider.apiKey",
                "No apiKey configured; chat requests will fail unless --mock is used",
            );
        }
    }

    check_temperature("provider.temperature", provider.temperature, report);
    if provider.max_tokens == Some(0) {
        report.error("provider.maxTokens", "maxTokens must be > 0");
    }
    if provider.timeout_secs == Some(0) {
        report.error("provider.timeoutSecs", "timeoutSecs must be > 0");
    }
}

fn validate_session(config: &TandemConfig, report: &mut ValidationReport) {
    let Some(session) = &config.session else { return };
    if session.max_turns == Some(0) {
        report.error("session.maxTurns", "maxTurns must be >= 1");
    }
    if let Some(dir) = &session.transcript_dir {
        if dir.trim().is_empty() {
            report.error("session.transcriptDir", "transcriptDir cannot be empty");
        }
    }
}

fn validate_evaluator(config: &TandemConfig, report: &mut ValidationReport) {
    let Some(evaluator) = &config.evaluator else { return };
    check_temperature("evaluator.temperature", evaluator.temperature, report);
}

fn validate_logging(config: &TandemConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        let known = matches!(
            level.to_ascii_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        );
        if !known {
            report.warn("logging.level", format!("Unrecognised log level '{level}'"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::apply_all_defaults;
    use crate::schema::{ProviderConfig, SessionConfig};

    #[test]
    fn defaults_only_warn_about_missing_key() {
        let report = validate(&apply_all_defaults(TandemConfig::default()));
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].path, "provider.apiKey");
    }

    #[test]
    fn zero_turns_is_error() {
        let mut cfg = apply_all_defaults(TandemConfig::default());
        cfg.session = Some(SessionConfig {
            max_turns: Some(0),
            ..Default::default()
        });
        let report = validate(&cfg);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "session.maxTurns");
    }

    #[test]
    fn temperature_out_of_range() {
        let cfg = TandemConfig {
            provider: Some(ProviderConfig {
                kind: Some("mock".into()),
                temperature: Some(2.5),
                ..Default::default()
            }),
            ..Default::default()
        };
        let report = validate(&cfg);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, "provider.temperature");
    }

    #[test]
    fn openai_without_base_url_is_error() {
        let cfg = TandemConfig {
            provider: Some(ProviderConfig {
                kind: Some("openai".into()),
                base_url: Some("  ".into()),
                api_key: Some("sk-x".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let report = validate(&cfg);
        assert!(report.errors.iter().any(|e| e.path == "provider.baseUrl"));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn mock_needs_nothing() {
        let cfg = TandemConfig {
            provider: Some(ProviderConfig {
                kind: Some("mock".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn unknown_kind_is_error() {
        let cfg = TandemConfig {
            provider: Some(ProviderConfig {
                kind: Some("gpt".into()),
                base_url: Some("http://x".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(validate(&cfg).errors.iter().any(|e| e.path == "provider.kind"));
    }
}
