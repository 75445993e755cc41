use regex::Regex;
use std::sync::OnceLock;

use crate::budget::{enforce_budget, Strategy, TARGET_WORDS};
use crate::narrator::narrate_scene;
use crate::person;
use crate::sanitize::{clean_basic, clean_strict, word_count};
use crate::scene::Storyboard;

pub const GENERIC_OPENING: &str = "This is my personal story of transformation.";
pub const CLOSING: &str =
    "This experience taught me that challenges can become opportunities for growth.";
pub const FALLBACK_CLOSING: &str = "It's my journey that shows how challenges can become opportunities for growth and understanding.";
pub const GENERIC_PARAGRAPH: &str = "This is my personal story of transformation and growth. A journey that demonstrates the power of resilience and the importance of learning from my experiences.";

const MAX_FRAGMENTS: usize = 3;
const MIN_FRAGMENT_WORDS: usize = 4;

/// Convert LLM storyboard text into a first-person voice-over script of at
/// most [`TARGET_WORDS`] words.
pub fn convert_storyboard_to_script(storyboard: &str) -> String {
    convert_storyboard_with_budget(storyboard, TARGET_WORDS)
}

pub fn convert_storyboard_with_budget(storyboard: &str, target_words: usize) -> String {
    let parsed = Storyboard::parse(storyboard);
    if parsed.is_empty() {
        return enforce_budget(&fallback_narrative(storyboard), target_words);
    }
    enforce_budget(&assemble(&parsed), target_words)
}

/// Opening, one sentence group per selected scene, closing. Not yet budgeted.
pub fn assemble(storyboard: &Storyboard) -> String {
    let strategy = Strategy::for_scene_count(storyboard.scenes.len());
    let selected = strategy.select(&storyboard.scenes);

    let mut parts = Vec::with_capacity(selected.len() + 2);
    parts.push(opening_sentence(&storyboard.title));
    for (i, scene) in selected.iter().enumerate() {
        parts.push(narrate_scene(scene, i + 1, selected.len()));
    }
    parts.push(CLOSING.to_string());

    clean_basic(&person::convert(&parts.join("\n")))
}

fn opening_sentence(title: &str) -> String {
    let title = clean_strict(title);
    if title.is_empty() {
        GENERIC_OPENING.to_string()
    } else {
        format!("This is my story of {}.", title.to_lowercase())
    }
}

fn non_word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s]").expect("valid non-word regex"))
}

/// Narrative for storyboards without any recognizable scene block.
pub fn fallback_narrative(storyboard: &str) -> String {
    let fragments: Vec<String> = storyboard
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("**") && !line.starts_with('•'))
        .map(|line| non_word_regex().replace_all(line, "").into_owned())
        .filter(|line| word_count(line) >= MIN_FRAGMENT_WORDS)
        .take(MAX_FRAGMENTS)
        .collect();

    let narrative = if fragments.is_empty() {
        GENERIC_PARAGRAPH.to_string()
    } else {
        format!(
            "{} {}. {}",
            GENERIC_OPENING,
            fragments.join(" "),
            FALLBACK_CLOSING
        )
    };
    clean_basic(&person::convert(&narrative))
}
