use serde::{Deserialize, Serialize};

use crate::sanitize::word_count;
use crate::scene::Scene;

/// Default narration length, roughly one minute of voice-over.
pub const TARGET_WORDS: usize = 160;

const MAX_SELECTED: usize = 4;
const MIN_PARTIAL_WORDS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Every scene is narrated.
    Detailed,
    /// Key scenes only.
    Balanced,
    /// Start, middle and end of a long storyboard.
    Summary,
}

impl Strategy {
    pub fn for_scene_count(count: usize) -> Self {
        match count {
            0..=3 => Strategy::Detailed,
            4..=6 => Strategy::Balanced,
            _ => Strategy::Summary,
        }
    }

    /// Scenes to narrate, in story order.
    pub fn select<'a>(self, scenes: &'a [Scene]) -> Vec<&'a Scene> {
        match self {
            Strategy::Detailed => scenes.iter().collect(),
            Strategy::Balanced if scenes.len() > MAX_SELECTED => key_scenes(scenes),
            Strategy::Balanced => scenes.iter().collect(),
            Strategy::Summary => summary_scenes(scenes),
        }
    }
}

/// First, middle, second-to-last and last scene.
pub fn key_scenes(scenes: &[Scene]) -> Vec<&Scene> {
    let n = scenes.len();
    if n == 0 {
        return Vec::new();
    }
    let mut indices = vec![0, n / 2];
    if n >= 2 {
        indices.push(n - 2);
    }
    indices.push(n - 1);
    indices.sort_unstable();
    indices.dedup();
    indices.into_iter().map(|i| &scenes[i]).collect()
}

/// Up to two scenes each from the start, the middle and the end, in that
/// order, deduplicated by scene number and capped at four.
pub fn summary_scenes(scenes: &[Scene]) -> Vec<&Scene> {
    let n = scenes.len();
    if n == 0 {
        return Vec::new();
    }
    let mid = n / 2;

    let candidates = [0, 1, mid, mid + 1, n.saturating_sub(2), n - 1];
    let mut picked: Vec<&Scene> = Vec::with_capacity(candidates.len());
    for index in candidates {
        if index >= n {
            continue;
        }
        let scene = &scenes[index];
        if picked.iter().any(|p| p.number == scene.number) {
            continue;
        }
        picked.push(scene);
    }
    picked.truncate(MAX_SELECTED);
    picked
}

/// Truncate `script` to at most `target` words, preferring whole sentences.
pub fn enforce_budget(script: &str, target: usize) -> String {
    if word_count(script) <= target {
        return finish_sentence(script);
    }

    let mut accepted: Vec<String> = Vec::new();
    let mut used = 0;
    for sentence in script.split(". ") {
        let words = word_count(sentence);
        if used + words + 1 <= target {
            accepted.push(sentence.trim().to_string());
            used += words + 1;
            continue;
        }

        let remaining = target.saturating_sub(used);
        if remaining >= MIN_PARTIAL_WORDS {
            let partial = sentence
                .split_whitespace()
                .take(remaining)
                .collect::<Vec<_>>()
                .join(" ");
            if !partial.trim().is_empty() {
                accepted.push(partial);
            }
        }
        break;
    }

    if accepted.is_empty() {
        return truncate_words(script, target);
    }
    finish_sentence(&accepted.join(". "))
}

/// Word-level truncation, cut back to a period found in the last fifth.
pub fn truncate_words(script: &str, target: usize) -> String {
    let words: Vec<&str> = script.split_whitespace().collect();
    if words.len() <= target {
        return finish_sentence(script);
    }
    let truncated = words[..target].join(" ");
    match truncated.rfind('.') {
        Some(pos) if pos as f64 > truncated.len() as f64 * 0.8 => truncated[..=pos].to_string(),
        _ => format!("{}.", truncated.trim_end_matches(['.', ' '])),
    }
}

/// Ensure exactly one trailing period, unless the text already ends in
/// `?` or `!`.
pub fn finish_sentence(text: &str) -> String {
    let trimmed = text.trim().trim_end_matches(|c: char| c == '.' || c.is_whitespace());
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.ends_with(['?', '!']) {
        return trimmed.to_string();
    }
    format!("{}.", trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenes(n: usize) -> Vec<Scene> {
        (1..=n).map(|i| Scene::new(i, format!("Scene {i}"))).collect()
    }

    fn numbers(selected: &[&Scene]) -> Vec<usize> {
        selected.iter().map(|s| s.number).collect()
    }

    #[test]
    fn test_strategy_for_scene_count() {
        assert_eq!(Strategy::for_scene_count(0), Strategy::Detailed);
        assert_eq!(Strategy::for_scene_count(3), Strategy::Detailed);
        assert_eq!(Strategy::for_scene_count(4), Strategy::Balanced);
        assert_eq!(Strategy::for_scene_count(6), Strategy::Balanced);
        assert_eq!(Strategy::for_scene_count(7), Strategy::Summary);
    }

    #[test]
    fn test_balanced_selection() {
        let four = scenes(4);
        assert_eq!(numbers(&Strategy::Balanced.select(&four)), vec![1, 2, 3, 4]);
        let five = scenes(5);
        assert_eq!(numbers(&Strategy::Balanced.select(&five)), vec![1, 3, 4, 5]);
        let six = scenes(6);
        assert_eq!(numbers(&Strategy::Balanced.select(&six)), vec![1, 4, 5, 6]);
    }

    #[test]
    fn test_summary_selection() {
        let seven = scenes(7);
        assert_eq!(numbers(&summary_scenes(&seven)), vec![1, 2, 4, 5]);
        let twelve = scenes(12);
        assert_eq!(numbers(&summary_scenes(&twelve)), vec![1, 2, 7, 8]);
    }

    #[test]
    fn test_summary_dedupes_repeated_numbers() {
        let mut repeated = scenes(8);
        repeated[4].number = 1;
        let selected = summary_scenes(&repeated);
        let mut nums = numbers(&selected);
        assert!(nums.len() <= 4);
        nums.dedup();
        assert_eq!(nums.len(), selected.len());
        assert_eq!(numbers(&selected), vec![1, 2, 6, 7]);
    }

    #[test]
    fn test_under_budget_is_untouched() {
        assert_eq!(enforce_budget("One two three.", 160), "One two three.");
        assert_eq!(enforce_budget("No period", 160), "No period.");
        assert_eq!(enforce_budget("Too many..", 160), "Too many.");
    }

    #[test]
    fn test_question_and_exclamation_endings_are_kept() {
        assert_eq!(enforce_budget("Is it true?", 160), "Is it true?");
        assert_eq!(enforce_budget("I made it!..", 160), "I made it!");
        assert_eq!(finish_sentence("Why not? "), "Why not?");
    }

    #[test]
    fn test_truncates_on_sentence_boundary() {
        let sentence = "word ".repeat(19) + "end";
        let script = vec![sentence.as_str(); 11].join(". ") + ".";
        assert_eq!(word_count(&script), 220);

        let out = enforce_budget(&script, 160);
        assert!(out.ends_with("word."));
        assert!(!out.ends_with(".."));
        // 7 whole sentences use 147 budget words, 13 remain for a partial.
        assert_eq!(word_count(&out), 7 * 20 + 13);
        assert_eq!(out.matches("end. ").count(), 7);
    }

    #[test]
    fn test_no_partial_below_ten_words() {
        let sentence = "word ".repeat(29) + "end";
        let script = vec![sentence.as_str(); 6].join(". ") + ".";
        let out = enforce_budget(&script, 100);
        // 3 sentences use 93, only 7 remain.
        assert_eq!(word_count(&out), 90);
        assert!(out.ends_with("end."));
    }

    #[test]
    fn test_oversized_first_sentence_is_cut_to_budget() {
        let script = "word ".repeat(300);
        let out = enforce_budget(&script, 160);
        assert_eq!(word_count(&out), 160);
        assert!(out.ends_with("word."));
    }

    #[test]
    fn test_flat_fallback_when_nothing_fits() {
        let script = "alpha beta gamma delta epsilon zeta eta theta";
        assert_eq!(enforce_budget(script, 5), "alpha beta gamma delta epsilon.");
    }

    #[test]
    fn test_truncate_words_cuts_at_late_period() {
        let script = format!("{}stop. tail tail", "word ".repeat(18));
        assert_eq!(word_count(&script), 21);
        let out = truncate_words(&script, 20);
        assert!(out.ends_with("stop."));
        assert_eq!(word_count(&out), 19);
    }
}
