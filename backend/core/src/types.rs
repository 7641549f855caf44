use std::fmt;

use serde::{Deserialize, Serialize};

/// An integer attribute that may arrive malformed from profile storage.
///
/// Stored as whatever the source provided; parsed only when a rule needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseInt {
    Number(i64),
    Text(String),
}

impl LooseInt {
    /// The parsed value, or `None` when the raw text is not an integer.
    pub fn value(&self) -> Option<i64> {
        match self {
            LooseInt::Number(n) => Some(*n),
            LooseInt::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl Default for LooseInt {
    fn default() -> Self {
        LooseInt::Text(String::new())
    }
}

impl From<i64> for LooseInt {
    fn from(n: i64) -> Self {
        LooseInt::Number(n)
    }
}

impl From<&str> for LooseInt {
    fn from(s: &str) -> Self {
        LooseInt::Text(s.to_string())
    }
}

impl fmt::Display for LooseInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LooseInt::Number(n) => write!(f, "{}", n),
            LooseInt::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    #[default]
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hard demographic attributes of a persona.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    pub age: LooseInt,
    /// Centimetres.
    #[serde(default)]
    pub height: LooseInt,
    /// Kilograms.
    #[serde(default)]
    pub weight: LooseInt,
    pub job: String,
    #[serde(default)]
    pub annual_salary: String,
    pub location: String,
    #[serde(default)]
    pub gender: Gender,
}

/// A user-supplied (question, answer) pair describing their own values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationPair {
    pub question: String,
    pub answer: String,
}

impl CalibrationPair {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Static description of an agent's persona.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaDescription {
    pub id: String,
    pub name: String,
    pub demographics: Demographics,
    /// Four-letter personality type code, e.g. "INTP".
    pub personality: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub values_keywords: Vec<String>,
    #[serde(default)]
    pub calibration: Vec<CalibrationPair>,
}

impl PersonaDescription {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        demographics: Demographics,
        personality: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            demographics,
            personality: personality.into(),
            interests: Vec::new(),
            values_keywords: Vec::new(),
            calibration: Vec::new(),
        }
    }

    pub fn with_interests<I, S>(mut self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interests = interests.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values_keywords = values.into_iter().map(Into::into).collect();
        self
    }

    /// Record how the user actually answers a situational question.
    pub fn calibrate(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.calibration.push(CalibrationPair::new(question, answer));
    }

    /// The `index`-th letter of the personality code, if present.
    pub fn personality_letter(&self, index: usize) -> Option<char> {
        self.personality.chars().nth(index)
    }
}

/// Hard match criteria a persona applies to candidates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MatchPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age_gap: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_height: Option<i64>,
    #[serde(default)]
    pub allowed_locations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_gender: Option<Gender>,
}

/// A persona together with its match preferences, as held by profile storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(flatten)]
    pub persona: PersonaDescription,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<MatchPreferences>,
}

impl Profile {
    pub fn new(persona: PersonaDescription, preferences: Option<MatchPreferences>) -> Self {
        Self {
            persona,
            preferences,
        }
    }

    pub fn id(&self) -> &str {
        &self.persona.id
    }

    pub fn name(&self) -> &str {
        &self.persona.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loose_int_parses_text() {
        assert_eq!(LooseInt::from("26").value(), Some(26));
        assert_eq!(LooseInt::from(" 30 ").value(), Some(30));
        assert_eq!(LooseInt::from("twenty").value(), None);
        assert_eq!(LooseInt::from(175_i64).value(), Some(175));
    }

    #[test]
    fn loose_int_accepts_numbers_and_strings() {
        let n: LooseInt = serde_json::from_str("24").unwrap();
        let s: LooseInt = serde_json::from_str("\"unknown\"").unwrap();
        assert_eq!(n.value(), Some(24));
        assert_eq!(s.value(), None);
    }

    #[test]
    fn calibrate_appends_pairs() {
        let mut persona = PersonaDescription::new("u1", "Alex", Demographics::default(), "INTP");
        assert!(persona.calibration.is_empty());
        persona.calibrate("They are 30 minutes late", "I'd browse the bookshop next door");
        persona.calibrate("Favourite weekend?", "Hiking");
        assert_eq!(persona.calibration.len(), 2);
        assert_eq!(persona.calibration[1].answer, "Hiking");
    }

    #[test]
    fn profile_flattens_persona() {
        let json = r#"{
            "id": "u2",
            "name": "Sarah",
            "demographics": {"age": 24, "job": "designer", "location": "Hangzhou", "gender": "female"},
            "personality": "ENFP",
            "interests": ["coffee"],
            "preferences": {"maxAgeGap": 5, "minHeight": 175}
        }"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.id(), "u2");
        assert_eq!(profile.persona.demographics.age.value(), Some(24));
        assert_eq!(profile.preferences.unwrap().max_age_gap, Some(5));
    }
}
