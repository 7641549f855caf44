//! Built-in demo profiles and profile store selection.

use std::path::Path;

use anyhow::Result;
use tandem_core::{
    Demographics, Gender, InMemoryProfileStore, LooseInt, MatchPreferences, PersonaDescription,
    Profile, ProfileStore,
};
use tracing::info;

pub fn alex() -> Profile {
    let demographics = Demographics {
        age: LooseInt::from(26_i64),
        height: LooseInt::from(178_i64),
        weight: LooseInt::from(70_i64),
        job: "Backend engineer".into(),
        annual_salary: "300k-500k".into(),
        location: "Hangzhou".into(),
        gender: Gender::Male,
    };
    let mut persona = PersonaDescription::new("alex", "Alex", demographics, "INTP")
        .with_interests(["sci-fi films", "Rust programming", "Zelda"])
        .with_values(["honesty", "independence"]);
    persona.calibrate(
        "Your date is 30 minutes late. What do you do?",
        "I'd browse the bookshop next door, but if it happens twice I'd start to wonder.",
    );
    persona.calibrate(
        "How do you feel about splitting the bill?",
        "Splitting is fine by me, whoever asked usually pays the first time.",
    );

    let preferences = MatchPreferences {
        max_age_gap: Some(3),
        min_height: Some(160),
        allowed_locations: vec!["Hangzhou".into()],
        preferred_gender: Some(Gender::Female),
    };
    Profile::new(persona, Some(preferences))
}

pub fn sarah() -> Profile {
    let demographics = Demographics {
        age: LooseInt::from(24_i64),
        height: LooseInt::from(165_i64),
        weight: LooseInt::from(50_i64),
        job: "UI designer".into(),
        annual_salary: "200k-300k".into(),
        location: "Hangzhou".into(),
        gender: Gender::Female,
    };
    let mut persona = PersonaDescription::new("sarah", "Sarah", demographics, "ENFP")
        .with_interests(["contemporary art", "pour-over coffee", "Miyazaki films"])
        .with_values(["curiosity", "kindness"]);
    persona.calibrate(
        "What does a perfect weekend look like?",
        "A gallery in the morning, a tiny coffee shop in the afternoon, no plans after that!",
    );

    let preferences = MatchPreferences {
        max_age_gap: Some(5),
        min_height: Some(175),
        allowed_locations: vec!["Hangzhou".into(), "Shanghai".into()],
        preferred_gender: Some(Gender::Male),
    };
    Profile::new(persona, Some(preferences))
}

pub fn demo_store() -> InMemoryProfileStore {
    [alex(), sarah()].into_iter().collect()
}

/// Profiles from `profiles.yaml` when present, otherwise the demo pair.
pub async fn profile_store(profiles_path: &Path) -> Result<Box<dyn ProfileStore>> {
    if profiles_path.exists() {
        let store = tandem_config::load_profiles(profiles_path).await?;
        return Ok(Box::new(store));
    }
    info!(path = %profiles_path.display(), "No profiles file, using demo profiles");
    Ok(Box::new(demo_store()))
}
