//! YAML profile files.
//!
//! ```yaml
//! profiles:
//!   - id: alex
//!     name: Alex
//!     demographics: { age: 26, height: 178, job: Engineer, location: Hangzhou, gender: male }
//!     personality: INTP
//!     interests: [sci-fi]
//!     preferences: { maxAgeGap: 3 }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tandem_core::{InMemoryProfileStore, Profile};
use tokio::fs;
use tracing::{info, warn};

/// Default profile file name within the config directory.
pub const PROFILES_FILE_NAME: &str = "profiles.yaml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilesFile {
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

/// Parse profile YAML into a store. Later duplicates replace earlier ones.
pub fn parse_profiles(raw: &str) -> Result<InMemoryProfileStore> {
    let file: ProfilesFile = serde_yaml::from_str(raw).context("Invalid profiles YAML")?;
    let mut store = InMemoryProfileStore::new();
    for profile in file.profiles {
        if profile.persona.personality.chars().count() != 4 {
            warn!(
                id = %profile.id(),
                personality = %profile.persona.personality,
                "Personality code is not four letters"
            );
        }
        store.insert(profile);
    }
    Ok(store)
}

pub async fn load_profiles(path: &Path) -> Result<InMemoryProfileStore> {
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read profiles file: {}", path.display()))?;
    let store = parse_profiles(&raw)
        .with_context(|| format!("Failed to parse profiles at: {}", path.display()))?;
    info!(path = %path.display(), count = store.len(), "Loaded profiles");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_core::ProfileStore;

    const YAML: &str = r#"
profiles:
  - id: alex
    name: Alex
    demographics: { age: 26, height: 178, job: Backend engineer, location: Hangzhou, gender: male }
    personality: INTP
    interests: [sci-fi, Rust]
    calibration:
      - question: They are 30 minutes late
        answer: I'd browse the bookshop next door
    preferences: { maxAgeGap: 3, minHeight: 160, allowedLocations: [Hangzhou], preferredGender: female }
  - id: sarah
    name: Sarah
    demographics: { age: "24", job: UI designer, location: Hangzhou }
    personality: ENFP
"#;

    #[test]
    fn parses_profiles() {
        let store = parse_profiles(YAML).unwrap();
        assert_eq!(store.ids(), vec!["alex".to_string(), "sarah".to_string()]);

        let alex = store.require("alex").unwrap();
        assert_eq!(alex.persona.calibration.len(), 1);
        assert_eq!(alex.preferences.unwrap().max_age_gap, Some(3));

        let sarah = store.require("sarah").unwrap();
        assert_eq!(sarah.persona.demographics.age.value(), Some(24));
        assert!(sarah.preferences.is_none());
        assert!(store.require("nobody").is_err());
    }

    #[tokio::test]
    async fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROFILES_FILE_NAME);
        std::fs::write(&path, YAML).unwrap();
        let store = load_profiles(&path).await.unwrap();
        assert_eq!(store.len(), 2);
        assert!(load_profiles(&dir.path().join("missing.yaml")).await.is_err());
    }
}
