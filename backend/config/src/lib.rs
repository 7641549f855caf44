//! `tandem-config` — Tandem runtime configuration management.
//!
//! Provides:
//! - Typed config schema (provider, session, evaluator, logging)
//! - YAML read/write with atomic backup rotation
//! - `${ENV_VAR}` substitution
//! - Config redaction for safe display
//! - Default value application and validation
//! - YAML profile files

pub mod defaults;
pub mod env;
pub mod io;
pub mod profiles;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{contains_env_var_reference, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, parse_config, write_config};
pub use profiles::{load_profiles, parse_profiles, ProfilesFile, PROFILES_FILE_NAME};
pub use redact::redact;
pub use schema::TandemConfig;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Result};
use std::path::Path;

/// Load, substitute env vars, apply defaults, and validate a config file.
///
/// This is the main entry point for loading a config at runtime. Warnings
/// are logged; any validation error fails the load.
pub async fn load_and_prepare(path: &Path) -> Result<TandemConfig> {
    let config = apply_all_defaults(load_config(path).await?);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.first() {
        bail!("{} (and {} more)", first, report.errors.len() - 1);
    }

    Ok(config)
}

/// The commented starting point written by `tandem config init`.
pub fn starter_config() -> TandemConfig {
    use schema::{ProviderConfig, SessionConfig};

    let mut config = apply_all_defaults(TandemConfig {
        provider: Some(ProviderConfig {
            api_key: Some("${MOONSHOT_API_KEY}".to_string()),
            ..Default::default()
        }),
        session: Some(SessionConfig::default()),
        ..Default::default()
    });
    // Resolved against the config dir at runtime.
    if let Some(logging) = config.logging.as_mut() {
        logging.dir = None;
    }
    config
}
