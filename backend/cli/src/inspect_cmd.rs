//! `tandem score` and `tandem prompt`: look at a pairing without calling a model.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tandem_agent::{MatchScorer, PersonaPromptBuilder, Phase, ScoreBreakdown};
use tandem_core::{Profile, ProfileStore};

use crate::terminal_output::render_breakdown;

/// Both directions: A judging B, then B judging A.
pub fn breakdowns(a: &Profile, b: &Profile) -> Vec<(String, ScoreBreakdown)> {
    vec![
        (
            format!("{} → {}", a.name(), b.name()),
            MatchScorer::breakdown(&a.persona, a.preferences.as_ref(), &b.persona),
        ),
        (
            format!("{} → {}", b.name(), a.name()),
            MatchScorer::breakdown(&b.persona, b.preferences.as_ref(), &a.persona),
        ),
    ]
}

pub fn score(store: &dyn ProfileStore, a: &str, b: &str) -> Result<()> {
    let (a, b) = (store.require(a)?, store.require(b)?);
    print!("{}", render_breakdown(&breakdowns(&a, &b)));
    Ok(())
}

/// A's system prompt built for prompt turn `turn`.
pub fn render_prompt(a: &Profile, b: &Profile, turn: u32, seed: Option<u64>) -> String {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let builder = PersonaPromptBuilder::new(&a.persona, a.preferences.as_ref());
    builder.build(turn, Some(&b.persona), &mut rng)
}

pub fn prompt(store: &dyn ProfileStore, a: &str, b: &str, turn: u32, seed: Option<u64>) -> Result<()> {
    let (a, b) = (store.require(a)?, store.require(b)?);
    tracing::debug!(turn, phase = ?Phase::for_turn(turn), "Rendering prompt");
    println!("{}", render_prompt(&a, &b, turn, seed));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::{alex, sarah};

    #[test]
    fn breakdowns_cover_both_directions() {
        let rows = breakdowns(&alex(), &sarah());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, "Alex → Sarah");
        assert_eq!(rows[1].0, "Sarah → Alex");
        assert_eq!(rows[0].1.personality, 2);
    }

    #[test]
    fn seeded_prompt_is_stable() {
        let (a, b) = (alex(), sarah());
        let first = render_prompt(&a, &b, 4, Some(3));
        let again = render_prompt(&a, &b, 4, Some(3));
        assert_eq!(first, again);
        assert!(first.contains("Value Probing"));
        assert!(first.contains("You are **Alex**"));
    }

    #[test]
    fn early_turns_skip_the_probe() {
        let prompt = render_prompt(&alex(), &sarah(), 1, None);
        assert!(prompt.contains("Icebreaker"));
        assert!(!prompt.contains("Value Probing"));
    }
}
