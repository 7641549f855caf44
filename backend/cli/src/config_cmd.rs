//! `tandem config init|show`.

use std::path::Path;

use anyhow::{Context, Result};
use tandem_config::{redact, ProfilesFile, PROFILES_FILE_NAME};

use crate::config::Settings;
use crate::demo;
use crate::terminal_output::{note_info, note_success, note_warn};

/// Write a starter config and the demo profiles, keeping existing files
/// unless `force` is set.
pub async fn init(config_dir: &Path, config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        note_warn(&format!(
            "{} already exists, pass --force to overwrite",
            config_path.display()
        ));
    } else {
        tandem_config::write_config(&tandem_config::starter_config(), config_path).await?;
        note_success(&format!("Wrote {}", config_path.display()));
    }

    let profiles_path = config_dir.join(PROFILES_FILE_NAME);
    if profiles_path.exists() {
        note_info(&format!("Keeping {}", profiles_path.display()));
        return Ok(());
    }
    let profiles = ProfilesFile {
        profiles: vec![demo::alex(), demo::sarah()],
    };
    let yaml = serde_yaml::to_string(&profiles).context("Failed to serialize demo profiles")?;
    tokio::fs::write(&profiles_path, yaml)
        .await
        .with_context(|| format!("Failed to write {}", profiles_path.display()))?;
    note_success(&format!("Wrote {}", profiles_path.display()));
    Ok(())
}

/// The effective config as JSON, secrets masked.
pub fn render(settings: &Settings) -> Result<String> {
    let value = serde_json::to_value(&settings.config)?;
    Ok(serde_json::to_string_pretty(&redact(&value))?)
}

pub fn show(settings: &Settings) -> Result<()> {
    note_info(&format!("Config file: {}", settings.config_path.display()));
    println!("{}", render(settings)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tandem_config::schema::ProviderConfig;
    use tandem_config::TandemConfig;
    use tandem_core::ProfileStore;

    #[tokio::test]
    async fn init_writes_config_and_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        init(dir.path(), &config_path, false).await.unwrap();

        let config = tandem_config::load_config(&config_path).await.unwrap();
        assert_eq!(config.session.unwrap().max_turns, Some(8));

        let store = tandem_config::load_profiles(&dir.path().join(PROFILES_FILE_NAME))
            .await
            .unwrap();
        assert_eq!(store.ids(), vec!["alex".to_string(), "sarah".to_string()]);
        let sarah = store.require("sarah").unwrap();
        assert_eq!(sarah.persona.calibration.len(), 1);
    }

    #[tokio::test]
    async fn init_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        tokio::fs::write(&config_path, "session:\n  maxTurns: 2\n").await.unwrap();
        init(dir.path(), &config_path, false).await.unwrap();

        let raw = tokio::fs::read_to_string(&config_path).await.unwrap();
        assert_eq!(raw, "session:\n  maxTurns: 2\n");
    }

    #[test]
    fn render_masks_api_key() {
        let settings = Settings {
            config: TandemConfig {
                provider: Some(ProviderConfig {
                    api_key: Some("sk-abcdefghijklmnop".into()),
                    ..Default::default()
                }),
                ..Default::default()
            },
            config_dir: PathBuf::from("/tmp"),
            config_path: PathBuf::from("/tmp/config.yaml"),
        };
        let out = render(&settings).unwrap();
        assert!(out.contains("sk-a***"));
        assert!(!out.contains("abcdefghijklmnop"));
    }
}
