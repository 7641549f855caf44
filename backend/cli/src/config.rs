//! Resolved runtime settings for one CLI invocation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tandem_agent::ModelConfig;
use tandem_config::defaults::{
    DEFAULT_ENGINE_TAG, DEFAULT_EVALUATOR_TEMPERATURE, DEFAULT_LOG_LEVEL, DEFAULT_MAX_TOKENS,
    DEFAULT_MAX_TURNS, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS, DEFAULT_TRANSCRIPT_DIR,
};
use tandem_config::TandemConfig;
use tandem_providers::{ProviderKind, ProviderSpec};

/// Config dir and file for an explicit `--config` path, or the defaults.
pub fn resolve_paths(explicit: Option<&Path>) -> (PathBuf, PathBuf) {
    match explicit {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            (dir, path.to_path_buf())
        }
        None => {
            let dir = tandem_config::config_dir();
            let path = tandem_config::config_file_path(&dir);
            (dir, path)
        }
    }
}

/// The loaded config file plus where it came from.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: TandemConfig,
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
}

impl Settings {
    /// Load from an explicit `--config` path, or the default location.
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        let (config_dir, config_path) = resolve_paths(explicit);
        let config = tandem_config::load_and_prepare(&config_path)
            .await
            .with_context(|| format!("Could not load config from {}", config_path.display()))?;
        Ok(Self {
            config,
            config_dir,
            config_path,
        })
    }

    pub fn provider_kind(&self) -> Result<ProviderKind> {
        let kind = self
            .config
            .provider
            .as_ref()
            .and_then(|p| p.kind.as_deref())
            .unwrap_or("openai");
        Ok(kind.parse()?)
    }

    pub fn provider_spec(&self, force_mock: bool) -> Result<ProviderSpec> {
        let provider = self.config.provider.clone().unwrap_or_default();
        let kind = if force_mock {
            ProviderKind::Mock
        } else {
            self.provider_kind()?
        };
        Ok(ProviderSpec {
            kind,
            base_url: provider.base_url,
            model: provider.model,
            api_key: provider.api_key.filter(|k| !k.trim().is_empty()),
            timeout: Duration::from_secs(provider.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        })
    }

    pub fn model_config(&self) -> ModelConfig {
        let provider = self.config.provider.as_ref();
        ModelConfig {
            model: None,
            max_tokens: provider
                .and_then(|p| p.max_tokens)
                .unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: provider
                .and_then(|p| p.temperature)
                .unwrap_or(DEFAULT_TEMPERATURE),
        }
    }

    pub fn max_turns(&self) -> u32 {
        self.config
            .session
            .as_ref()
            .and_then(|s| s.max_turns)
            .unwrap_or(DEFAULT_MAX_TURNS)
    }

    pub fn transcript_dir(&self) -> PathBuf {
        let dir = self
            .config
            .session
            .as_ref()
            .and_then(|s| s.transcript_dir.clone())
            .unwrap_or_else(|| DEFAULT_TRANSCRIPT_DIR.to_string());
        PathBuf::from(dir)
    }

    pub fn engine_tag(&self) -> String {
        self.config
            .session
            .as_ref()
            .and_then(|s| s.engine_tag.clone())
            .unwrap_or_else(|| DEFAULT_ENGINE_TAG.to_string())
    }

    pub fn persist(&self) -> bool {
        self.config
            .session
            .as_ref()
            .and_then(|s| s.persist)
            .unwrap_or(true)
    }

    pub fn evaluator_model(&self) -> Option<String> {
        self.config.evaluator.as_ref().and_then(|e| e.model.clone())
    }

    pub fn evaluator_temperature(&self) -> f32 {
        self.config
            .evaluator
            .as_ref()
            .and_then(|e| e.temperature)
            .unwrap_or(DEFAULT_EVALUATOR_TEMPERATURE)
    }

    pub fn log_level(&self) -> String {
        self.config
            .logging
            .as_ref()
            .and_then(|l| l.level.clone())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
    }

    /// Defaults to `<config dir>/logs`.
    pub fn log_dir(&self) -> PathBuf {
        self.config
            .logging
            .as_ref()
            .and_then(|l| l.dir.as_ref())
            .map(PathBuf::from)
            .unwrap_or_else(|| self.config_dir.join("logs"))
    }

    pub fn profiles_path(&self) -> PathBuf {
        self.config_dir.join(tandem_config::PROFILES_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_config::schema::{ProviderConfig, SessionConfig};

    fn settings(config: TandemConfig) -> Settings {
        Settings {
            config: tandem_config::apply_all_defaults(config),
            config_dir: PathBuf::from("/tmp/tandem-test"),
            config_path: PathBuf::from("/tmp/tandem-test/config.yaml"),
        }
    }

    #[test]
    fn defaults_resolve() {
        let s = settings(TandemConfig::default());
        assert_eq!(s.max_turns(), 8);
        assert_eq!(s.transcript_dir(), PathBuf::from("logs"));
        assert_eq!(s.engine_tag(), "tandem");
        assert!(s.persist());
        assert_eq!(s.log_dir(), PathBuf::from("/tmp/tandem-test/logs"));
        assert_eq!(s.provider_kind().unwrap(), ProviderKind::OpenAi);
        assert_eq!(s.model_config().max_tokens, 1024);
    }

    #[test]
    fn explicit_path_sets_config_dir() {
        let (dir, path) = resolve_paths(Some(Path::new("/etc/tandem/custom.yaml")));
        assert_eq!(dir, PathBuf::from("/etc/tandem"));
        assert_eq!(path, PathBuf::from("/etc/tandem/custom.yaml"));

        let (dir, _) = resolve_paths(Some(Path::new("custom.yaml")));
        assert_eq!(dir, PathBuf::from("."));
    }

    #[test]
    fn mock_flag_overrides_kind() {
        let s = settings(TandemConfig {
            provider: Some(ProviderConfig {
                api_key: Some("  ".into()),
                ..Default::default()
            }),
            session: Some(SessionConfig {
                max_turns: Some(3),
                ..Default::default()
            }),
            ..Default::default()
        });
        let spec = s.provider_spec(true).unwrap();
        assert_eq!(spec.kind, ProviderKind::Mock);
        assert!(spec.api_key.is_none());
        assert_eq!(spec.timeout, Duration::from_secs(120));
        assert_eq!(s.max_turns(), 3);
    }
}
