use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tandem_core::CompletionProvider;
use tracing::info;

use crate::mock::MockProvider;
use crate::ollama::OllamaProvider;
use crate::openai::OpenAiCompatProvider;

/// Which adapter serves completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Ollama,
    Mock,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Ollama => "ollama",
            ProviderKind::Mock => "mock",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown provider kind '{0}'. Use 'openai', 'ollama', or 'mock'")]
pub struct UnknownProviderKind(pub String);

impl FromStr for ProviderKind {
    type Err = UnknownProviderKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "moonshot" | "kimi" => Ok(ProviderKind::OpenAi),
            "ollama" => Ok(ProviderKind::Ollama),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(UnknownProviderKind(other.to_string())),
        }
    }
}

/// Everything needed to construct one provider.
#[derive(Debug, Clone)]
pub struct ProviderSpec {
    pub kind: ProviderKind,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for ProviderSpec {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            base_url: None,
            model: None,
            api_key: None,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Build a provider from its spec.
pub fn build_provider(spec: &ProviderSpec) -> Result<Arc<dyn CompletionProvider>> {
    let provider: Arc<dyn CompletionProvider> = match spec.kind {
        ProviderKind::OpenAi => {
            let api_key = spec
                .api_key
                .as_deref()
                .filter(|k| !k.trim().is_empty())
                .context("The openai provider requires an API key")?;
            let mut p = OpenAiCompatProvider::new(api_key, spec.timeout)?;
            if let Some(url) = &spec.base_url {
                p = p.with_base_url(url);
            }
            if let Some(model) = &spec.model {
                p = p.with_model(model);
            }
            Arc::new(p)
        }
        ProviderKind::Ollama => {
            let mut p = OllamaProvider::new();
            if let Some(url) = &spec.base_url {
                p = p.with_base_url(url);
            }
            if let Some(model) = &spec.model {
                p = p.with_model(model);
            }
            Arc::new(p)
        }
        ProviderKind::Mock => Arc::new(MockProvider::scripted()),
    };
    info!(provider = %spec.kind, "Built completion provider");
    Ok(provider)
}

/// Registry of completion providers, looked up by name.
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn CompletionProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// A registry holding the configured provider plus the offline mock.
    pub fn from_spec(spec: &ProviderSpec) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(ProviderKind::Mock.as_str(), Arc::new(MockProvider::scripted()));
        if spec.kind != ProviderKind::Mock {
            registry.register(spec.kind.as_str(), build_provider(spec)?);
        }
        Ok(registry)
    }

    /// Register a provider by name.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn CompletionProvider>) {
        self.providers.insert(name.into(), provider);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn CompletionProvider>> {
        self.providers.get(name).cloned()
    }

    /// Get all registered provider names, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!("kimi".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!("ollama".parse::<ProviderKind>().unwrap(), ProviderKind::Ollama);
        assert!("gpt".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_openai_requires_key() {
        let spec = ProviderSpec::default();
        assert!(build_provider(&spec).is_err());

        let spec = ProviderSpec {
            api_key: Some("sk-test".into()),
            ..Default::default()
        };
        assert_eq!(build_provider(&spec).unwrap().name(), "openai");
    }

    #[test]
    fn test_registry_from_spec() {
        let spec = ProviderSpec {
            kind: ProviderKind::Ollama,
            ..Default::default()
        };
        let registry = ProviderRegistry::from_spec(&spec).unwrap();
        assert_eq!(registry.list(), vec!["mock".to_string(), "ollama".to_string()]);
        assert!(registry.get("openai").is_none());

        let mock_only = ProviderRegistry::from_spec(&ProviderSpec {
            kind: ProviderKind::Mock,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(mock_only.list(), vec!["mock".to_string()]);
    }
}
