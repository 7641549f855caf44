//! Persona system prompt builder.
//!
//! The prompt is rebuilt every turn: the phase tracks how far the
//! conversation has progressed, and the attitude block depends on how the
//! persona rates its counterpart.

use std::fmt::Write as _;

use rand::Rng;
use rand::seq::SliceRandom;
use tandem_core::{Gender, MatchPreferences, PersonaDescription};

use crate::match_score::MatchScorer;

/// Asked during value probing when the persona has no calibration data.
pub const DEFAULT_PROBE_QUESTION: &str = "What are your plans for the future?";

/// Match score at or above which the persona warms up.
pub const HIGH_ATTITUDE_THRESHOLD: u8 = 6;

/// Coarse conversational stage derived from the turn number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Icebreaker,
    ValueProbing,
    Closing,
}

impl Phase {
    pub fn for_turn(turn: u32) -> Self {
        match turn {
            0..=2 => Phase::Icebreaker,
            3..=5 => Phase::ValueProbing,
            _ => Phase::Closing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attitude {
    High,
    Low,
}

impl Attitude {
    pub fn from_score(score: u8) -> Self {
        if score >= HIGH_ATTITUDE_THRESHOLD {
            Attitude::High
        } else {
            Attitude::Low
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Attitude::High => "🌟 Warm and engaged (high interest)",
            Attitude::Low => "❄️ Polite but distant (low interest)",
        }
    }

    fn guide(&self) -> &'static str {
        match self {
            Attitude::High => {
                "- Show clear interest!\n\
                 - **Answer + Ask**: answer their question in some detail, then follow up on a related detail.\n\
                 - Keep the tone upbeat and use emoji freely (😊, ✨, 🎉, 🤣).\n\
                 - Compliment them or look for common ground (\"No way, me too!\").\n"
            }
            Attitude::Low => {
                "- Stay polite but keep your distance.\n\
                 - **Answer Only**: reply briefly and do not ask anything back.\n\
                 - Close topics with fillers like \"mm-hm\", \"sounds nice\", \"haha\".\n\
                 - Come across as busy, a bit of a conversation stopper.\n\
                 - Go easy on the emoji.\n"
            }
        }
    }
}

fn style_directive(letter: char) -> Option<&'static str> {
    let directive = match letter {
        'I' => "You are fairly introverted: keep messages short, you enjoy listening and get a little shy at times.",
        'E' => "You are very outgoing and warm, you like exclamation marks and you are the one who starts topics.",
        'N' => "You like abstract topics (the future, dreams, ideas) and care little for everyday trivia.",
        'S' => "You are practical: you like talking about food, outings, work and daily life, not empty theory.",
        'T' => "You are logical and direct, you focus on facts and avoid overly emotional language.",
        'F' => "You are emotional and considerate, you pay attention to how the other person feels and speak gently.",
        'J' => "You like plans and certainty and dislike it when the other person is too casual.",
        'P' => "You are spontaneous and flexible and hate being boxed in by rules.",
        _ => return None,
    };
    Some(directive)
}

fn gender_label(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "Male",
        Gender::Female => "Female",
    }
}

/// Builds the system prompt for one persona.
pub struct PersonaPromptBuilder<'a> {
    persona: &'a PersonaDescription,
    preferences: Option<&'a MatchPreferences>,
}

impl<'a> PersonaPromptBuilder<'a> {
    pub fn new(persona: &'a PersonaDescription, preferences: Option<&'a MatchPreferences>) -> Self {
        Self {
            persona,
            preferences,
        }
    }

    /// The value-probing question for this turn, drawn from the persona's
    /// own calibration list.
    pub fn probe_question<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        self.persona
            .calibration
            .choose(rng)
            .map(|pair| pair.question.clone())
            .unwrap_or_else(|| DEFAULT_PROBE_QUESTION.to_string())
    }

    pub fn build<R: Rng + ?Sized>(
        &self,
        turn: u32,
        counterpart: Option<&PersonaDescription>,
        rng: &mut R,
    ) -> String {
        let p = self.persona;
        let d = &p.demographics;
        let mut prompt = String::new();

        let _ = write!(
            prompt,
            "# Role\n\
             You are not an AI. You are **{name}**.\n\
             You are chatting with someone on a dating app.\n\n\
             # My Profile\n\
             - Gender: {gender}\n\
             - Age: {age}\n\
             - Job: {job}\n\
             - Location: {location}\n\
             - MBTI: {mbti}\n\
             - Interests: {interests}\n\n",
            name = p.name,
            gender = gender_label(d.gender),
            age = d.age,
            job = d.job,
            location = d.location,
            mbti = p.personality,
            interests = p.interests.join(", "),
        );

        prompt.push_str("# Personality & Style\n");
        for directive in p.personality.chars().filter_map(style_directive) {
            let _ = writeln!(prompt, "- {}", directive);
        }
        prompt.push_str(
            "- **Tone**: fully conversational, like texting a friend.\n\
             - **Length**: keep every reply to 1-3 sentences.\n\
             - **Never** say things like \"as an AI\" or \"I am a program\".\n\n",
        );

        prompt.push_str(&self.attitude_block(counterpart));

        prompt.push_str(
            "# Critical Communication Rules (highest priority)\n\
             - **Answer FIRST**: if they asked you a question, answer it before anything else. Never ignore it to start a new topic.\n\
             - **NO REPETITION**: do not echo their pleasantries (\"hope we can be good friends\", \"let's grow together\"). If they already said goodbye, reply with a simple \"bye\" or \"see you\".\n\
             - **Stop the Loop**: if the two of you are stuck complimenting each other (\"haha that's great\"), break it with a concrete, completely different question (\"By the way, what are you reading lately?\") or end the chat.\n\
             - **Follow-up**: only after answering, decide whether to ask back or open a new topic.\n\
             - Don't talk past them.\n\n",
        );

        let phase = Phase::for_turn(turn);
        prompt.push_str("# Current Phase\n");
        match phase {
            Phase::Icebreaker => prompt.push_str(
                "[Phase 1: Icebreaker]\n\
                 - You just met, keep it to light small talk.\n\
                 - If your attitude is high, feel free to bring up topics; if low, just reply politely.\n",
            ),
            Phase::ValueProbing => {
                let question = self.probe_question(rng);
                let _ = write!(
                    prompt,
                    "[Phase 2: Value Probing]\n\
                     - This is the key stage. Find out what they value by asking.\n\
                     - **Required**: naturally work this question into the conversation (it matters a lot to you):\n  \
                     \"{}\"\n\
                     - Pay close attention to whether their answer matches what you hope for.\n",
                    question
                );
            }
            Phase::Closing => prompt.push_str(
                "[Phase 3: Closing]\n\
                 - If you already agreed when to talk or meet next, just say a short goodbye (\"Great, it's a plan. Bye!\"). Do **not** give a long speech.\n\
                 - Do not parrot their \"let's grow together\" or \"let's be good friends\" lines.\n\
                 - Aim to wrap up cleanly.\n",
            ),
        }

        prompt.push_str(
            "\n# Context\n\
             You are chatting with a stranger you just met. Output only what you would send, no inner monologue.\n",
        );

        if !p.calibration.is_empty() {
            prompt.push_str("\n# Tone Reference (things you have said before)\n");
            for pair in &p.calibration {
                let _ = writeln!(prompt, "- Q: {}\n  A: {}", pair.question, pair.answer);
            }
        }

        prompt
    }

    fn attitude_block(&self, counterpart: Option<&PersonaDescription>) -> String {
        let Some(target) = counterpart else {
            return "# Attitude\n\
                    You don't know anything about them yet. Stay polite and curious and try to get to know them through the conversation.\n\n"
                .to_string();
        };

        let score = MatchScorer::score(self.persona, self.preferences, target);
        let attitude = Attitude::from_score(score);
        let td = &target.demographics;

        format!(
            "# Match Profile\n\
             - Name: {name}\n\
             - Gender: {gender}\n\
             - Age: {age}\n\
             - Job: {job}\n\
             - MBTI: {mbti}\n\
             - Interests: {interests}\n\n\
             # Internal Assessment (important!)\n\
             You quickly sized them up in your head: the match is roughly {score}/10.\n\
             Your attitude: {label}\n\n\
             Follow this guide strictly:\n\
             {guide}\n",
            name = target.name,
            gender = gender_label(td.gender),
            age = td.age,
            job = td.job,
            mbti = target.personality,
            interests = target.interests.join(", "),
            score = score,
            label = attitude.label(),
            guide = attitude.guide(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tandem_core::{CalibrationPair, Demographics, LooseInt};

    fn alex() -> PersonaDescription {
        let demographics = Demographics {
            age: LooseInt::from(26_i64),
            height: LooseInt::from(178_i64),
            job: "Backend engineer".into(),
            location: "Hangzhou".into(),
            gender: Gender::Male,
            ..Default::default()
        };
        PersonaDescription::new("alex", "Alex", demographics, "INTP")
            .with_interests(["sci-fi", "Rust", "Zelda"])
    }

    fn sarah() -> PersonaDescription {
        let demographics = Demographics {
            age: LooseInt::from(24_i64),
            height: LooseInt::from(165_i64),
            job: "UI designer".into(),
            location: "Hangzhou".into(),
            gender: Gender::Female,
            ..Default::default()
        };
        PersonaDescription::new("sarah", "Sarah", demographics, "ENFP")
            .with_interests(["contemporary art", "pour-over coffee"])
    }

    fn section<'p>(prompt: &'p str, heading: &str) -> &'p str {
        let start = prompt.find(heading).expect("heading present");
        let rest = &prompt[start + heading.len()..];
        match rest.find("\n# ") {
            Some(end) => &rest[..end],
            None => rest,
        }
    }

    #[test]
    fn test_phase_for_turn() {
        assert_eq!(Phase::for_turn(1), Phase::Icebreaker);
        assert_eq!(Phase::for_turn(2), Phase::Icebreaker);
        for turn in 3..=5 {
            assert_eq!(Phase::for_turn(turn), Phase::ValueProbing);
        }
        assert_eq!(Phase::for_turn(6), Phase::Closing);
        assert_eq!(Phase::for_turn(40), Phase::Closing);
    }

    #[test]
    fn test_always_present_rules() {
        let persona = alex();
        let mut rng = StdRng::seed_from_u64(1);
        for turn in [1, 4, 7] {
            let prompt = PersonaPromptBuilder::new(&persona, None).build(turn, None, &mut rng);
            assert!(prompt.contains("You are not an AI. You are **Alex**"));
            assert!(prompt.contains("**Answer FIRST**"));
            assert!(prompt.contains("**NO REPETITION**"));
            assert!(prompt.contains("**Stop the Loop**"));
            assert!(prompt.contains("1-3 sentences"));
        }
    }

    #[test]
    fn test_style_directives_follow_code() {
        let mut persona = alex();
        persona.personality = "IXTQ".into();
        let prompt = PersonaPromptBuilder::new(&persona, None).build(1, None, &mut StdRng::seed_from_u64(0));
        let style = section(&prompt, "# Personality & Style");
        assert!(style.contains("introverted"));
        assert!(style.contains("logical and direct"));
        assert!(!style.contains("outgoing"));
        assert!(!style.contains("spontaneous"));
    }

    #[test]
    fn test_neutral_attitude_without_counterpart() {
        let persona = alex();
        let prompt = PersonaPromptBuilder::new(&persona, None).build(1, None, &mut StdRng::seed_from_u64(0));
        assert!(prompt.contains("# Attitude"));
        assert!(!prompt.contains("# Internal Assessment"));
    }

    #[test]
    fn test_attitude_follows_match_score() {
        let alex = alex();
        let sarah = sarah();
        let mut rng = StdRng::seed_from_u64(0);

        // 5 + age(+1) + personality(+2) = 8
        let prompt = PersonaPromptBuilder::new(&alex, None).build(1, Some(&sarah), &mut rng);
        assert!(prompt.contains("roughly 8/10"));
        assert!(prompt.contains("**Answer + Ask**"));
        assert!(prompt.contains("- Name: Sarah"));

        // Strict preferences push the score below the threshold.
        let strict = MatchPreferences {
            max_age_gap: Some(1),
            min_height: Some(180),
            ..Default::default()
        };
        let prompt = PersonaPromptBuilder::new(&alex, Some(&strict)).build(1, Some(&sarah), &mut rng);
        assert!(prompt.contains("roughly 3/10"));
        assert!(prompt.contains("**Answer Only**"));
        assert_eq!(Attitude::from_score(6), Attitude::High);
        assert_eq!(Attitude::from_score(5), Attitude::Low);
    }

    #[test]
    fn test_probing_uses_one_calibration_question() {
        let mut persona = alex();
        persona.calibrate("They are 30 minutes late", "I'd browse the bookshop next door");
        persona.calibrate("Split the bill?", "Always");
        persona.calibrate("Pets?", "Two cats");
        let questions: Vec<&str> = persona.calibration.iter().map(|c| c.question.as_str()).collect();

        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            let prompt = PersonaPromptBuilder::new(&persona, None).build(4, None, &mut rng);
            let phase = section(&prompt, "# Current Phase");
            assert!(phase.contains("Value Probing"));
            let hits = questions.iter().filter(|q| phase.contains(*q)).count();
            assert_eq!(hits, 1, "seed {seed}");
        }
    }

    #[test]
    fn test_probe_question_matches_seeded_draw() {
        let mut persona = alex();
        persona.calibrate("Q1", "A1");
        persona.calibrate("Q2", "A2");
        let builder = PersonaPromptBuilder::new(&persona, None);

        let expected = builder.probe_question(&mut StdRng::seed_from_u64(42));
        let prompt = builder.build(3, None, &mut StdRng::seed_from_u64(42));
        assert!(section(&prompt, "# Current Phase").contains(&format!("\"{}\"", expected)));
    }

    #[test]
    fn test_probing_default_question_without_calibration() {
        let persona = alex();
        let prompt = PersonaPromptBuilder::new(&persona, None).build(5, None, &mut StdRng::seed_from_u64(0));
        assert!(section(&prompt, "# Current Phase").contains(DEFAULT_PROBE_QUESTION));
        assert!(!prompt.contains("# Tone Reference"));
    }

    #[test]
    fn test_closing_phase() {
        let persona = alex();
        let prompt = PersonaPromptBuilder::new(&persona, None).build(6, None, &mut StdRng::seed_from_u64(0));
        let phase = section(&prompt, "# Current Phase");
        assert!(phase.contains("Closing"));
        assert!(!phase.contains(DEFAULT_PROBE_QUESTION));
    }

    #[test]
    fn test_tone_reference_lists_every_pair() {
        let mut persona = alex();
        persona.calibration = vec![
            CalibrationPair::new("Late date?", "I'd wait with a book"),
            CalibrationPair::new("Weekend?", "Hiking"),
        ];
        let prompt = PersonaPromptBuilder::new(&persona, None).build(1, None, &mut StdRng::seed_from_u64(0));
        let tone = section(&prompt, "# Tone Reference");
        assert!(tone.contains("- Q: Late date?\n  A: I'd wait with a book"));
        assert!(tone.contains("- Q: Weekend?\n  A: Hiking"));
    }
}
