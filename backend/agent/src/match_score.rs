//! Rule-based compatibility heuristic.
//!
//! Every rule adds or subtracts from a base of 5 and the result is clamped
//! to `0..=10`. Rules whose inputs cannot be parsed are skipped.

use serde::Serialize;
use tandem_core::{MatchPreferences, PersonaDescription};

const BASE_SCORE: i64 = 5;
const DEFAULT_MAX_AGE_GAP: i64 = 5;
const INTEREST_BONUS: i64 = 3;

/// Per-rule contributions to a match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ScoreBreakdown {
    pub age: i64,
    pub height: i64,
    pub interests: i64,
    pub personality: i64,
}

impl ScoreBreakdown {
    /// Base plus all contributions, clamped to `0..=10`.
    pub fn total(&self) -> u8 {
        let raw = BASE_SCORE + self.age + self.height + self.interests + self.personality;
        raw.clamp(0, 10) as u8
    }
}

pub struct MatchScorer;

impl MatchScorer {
    /// How well `target` fits `me`, from `me`'s point of view.
    pub fn score(
        me: &PersonaDescription,
        preferences: Option<&MatchPreferences>,
        target: &PersonaDescription,
    ) -> u8 {
        Self::breakdown(me, preferences, target).total()
    }

    pub fn breakdown(
        me: &PersonaDescription,
        preferences: Option<&MatchPreferences>,
        target: &PersonaDescription,
    ) -> ScoreBreakdown {
        ScoreBreakdown {
            age: age_rule(me, preferences, target),
            height: height_rule(preferences, target),
            interests: interest_rule(me, target),
            personality: personality_rule(me, target),
        }
    }
}

fn age_rule(
    me: &PersonaDescription,
    preferences: Option<&MatchPreferences>,
    target: &PersonaDescription,
) -> i64 {
    let (Some(my_age), Some(their_age)) = (
        me.demographics.age.value(),
        target.demographics.age.value(),
    ) else {
        return 0;
    };
    let Some(gap) = my_age.checked_sub(their_age).and_then(i64::checked_abs) else {
        return 0;
    };

    match preferences.and_then(|p| p.max_age_gap) {
        Some(max_gap) if gap <= max_gap => 1,
        Some(_) => -2,
        None if gap <= DEFAULT_MAX_AGE_GAP => 1,
        None => 0,
    }
}

fn height_rule(preferences: Option<&MatchPreferences>, target: &PersonaDescription) -> i64 {
    let Some(min_height) = preferences.and_then(|p| p.min_height) else {
        return 0;
    };
    match target.demographics.height.value() {
        Some(height) if height >= min_height => 1,
        Some(_) => -2,
        None => 0,
    }
}

/// Flat bonus when any pair of interests contains one another.
fn interest_rule(me: &PersonaDescription, target: &PersonaDescription) -> i64 {
    let overlaps = me.interests.iter().any(|mine| {
        target
            .interests
            .iter()
            .any(|theirs| mine.contains(theirs.as_str()) || theirs.contains(mine.as_str()))
    });
    if overlaps { INTEREST_BONUS } else { 0 }
}

/// Opposite first letters complement; matching second letters connect.
fn personality_rule(me: &PersonaDescription, target: &PersonaDescription) -> i64 {
    let mut delta = 0;
    if let (Some(a), Some(b)) = (me.personality_letter(0), target.personality_letter(0)) {
        if a != b {
            delta += 1;
        }
    }
    if let (Some(a), Some(b)) = (me.personality_letter(1), target.personality_letter(1)) {
        if a == b {
            delta += 1;
        }
    }
    delta
}
