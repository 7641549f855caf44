use std::collections::BTreeMap;

use crate::error::TandemError;
use crate::types::Profile;

/// Read-only source of persona profiles.
pub trait ProfileStore: Send + Sync {
    fn get(&self, id: &str) -> Option<Profile>;

    fn ids(&self) -> Vec<String>;

    /// Like `get`, but a missing profile is an error.
    fn require(&self, id: &str) -> Result<Profile, TandemError> {
        self.get(id)
            .ok_or_else(|| TandemError::ProfileNotFound(id.to_string()))
    }
}

/// Profiles held in memory, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileStore {
    profiles: BTreeMap<String, Profile>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a profile.
    pub fn insert(&mut self, profile: Profile) {
        self.profiles.insert(profile.id().to_string(), profile);
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl FromIterator<Profile> for InMemoryProfileStore {
    fn from_iter<T: IntoIterator<Item = Profile>>(iter: T) -> Self {
        let mut store = Self::new();
        for profile in iter {
            store.insert(profile);
        }
        store
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn get(&self, id: &str) -> Option<Profile> {
        self.profiles.get(id).cloned()
    }

    fn ids(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }
}
