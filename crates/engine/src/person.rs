//! Third-person to first-person rewriting.
//!
//! Replacement is plain substring substitution, applied in table order and
//! without word boundaries, so it also fires inside longer words ("the " holds
//! "he ", "other " holds "her "). The fixup pass afterwards repairs the
//! recurring damage and collapses doubled pronouns. `convert` is idempotent.

use regex::Regex;
use std::sync::OnceLock;

/// Longer keys precede the shorter keys they contain.
const SUBSTITUTIONS: &[(&str, &str)] = &[
    ("the main character", "I"),
    ("the protagonist", "I"),
    ("the individual", "I"),
    ("the person", "I"),
    ("themselves", "myself"),
    ("Themselves", "Myself"),
    ("their ", "my "),
    ("Their ", "My "),
    ("them ", "me "),
    ("Them ", "Me "),
    ("they ", "I "),
    ("They ", "I "),
    ("himself", "myself"),
    ("Himself", "Myself"),
    ("herself", "myself"),
    ("Herself", "Myself"),
    ("she ", "I "),
    ("She ", "I "),
    ("her ", "my "),
    ("Her ", "My "),
    ("his ", "my "),
    ("His ", "My "),
    ("him ", "me "),
    ("Him ", "Me "),
    ("he ", "I "),
    ("He ", "I "),
];

struct Fixup {
    pattern: Regex,
    replacement: &'static str,
}

fn fixups() -> &'static [Fixup] {
    static FIXUPS: OnceLock<Vec<Fixup>> = OnceLock::new();
    FIXUPS.get_or_init(|| {
        [
            (r"\bI(?: I)+\b", "I"),
            (r"\bme(?: me)+\b", "me"),
            (r"\bmy(?: my)+\b", "my"),
            // "this " -> "tmy "
            (r"\bTmy\b", "This"),
            (r"\btmy\b", "this"),
            // "other " -> "otmy ", "teacher " -> "teacmy "
            (r"\b([A-Za-z]+[tcgps])my\b", "${1}her"),
            // "The " -> "TI ", "the " -> "tI ", "ache " -> "acI "
            (r"\bTI\b", "The"),
            (r"([a-z])I\b", "${1}he"),
            (r"\bti\b", "the"),
        ]
        .into_iter()
        .map(|(pattern, replacement)| Fixup {
            pattern: Regex::new(pattern).expect("valid fixup regex"),
            replacement,
        })
        .collect()
    })
}

/// Rewrite third-person references toward first person.
pub fn convert(text: &str) -> String {
    let mut result = text.to_string();
    for (from, to) in SUBSTITUTIONS {
        if result.contains(from) {
            result = result.replace(from, to);
        }
    }

    for fixup in fixups() {
        result = fixup
            .pattern
            .replace_all(&result, fixup.replacement)
            .into_owned();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pronouns() {
        assert_eq!(convert("he walks home"), "I walks home");
        assert_eq!(convert("She said her name"), "I said my name");
        assert_eq!(convert("they lost their keys"), "I lost my keys");
        assert_eq!(convert("He hurt himself"), "I hurt myself");
        assert_eq!(convert("I watch the person fall"), "I watch I fall");
    }

    #[test]
    fn test_substring_damage_is_repaired() {
        assert_eq!(convert("the stairs"), "the stairs");
        assert_eq!(convert("The stairs"), "The stairs");
        assert_eq!(convert("This is mine"), "This is mine");
        assert_eq!(convert("this moment"), "this moment");
        assert_eq!(convert("my other friend"), "my other friend");
        assert_eq!(convert("a teacher spoke"), "a teacher spoke");
        assert_eq!(convert("a headache came"), "a headache came");
        assert_eq!(convert("a gloomy sky"), "a gloomy sky");
    }

    #[test]
    fn test_doubled_pronouns_collapse() {
        assert_eq!(convert("I I I see"), "I see");
        assert_eq!(convert("give me me me that"), "give me that");
        assert_eq!(convert("my my keys"), "my keys");
    }

    #[test]
    fn test_stray_artifacts() {
        assert_eq!(convert("tmy is it"), "this is it");
        assert_eq!(convert("ti stairs"), "the stairs");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "He saw the person at the top of the stairs with his phone.",
            "They said their mother would visit them soon.",
            "This is the story of her brother and the teacher.",
            "I find myself. where I see a person falling down stairs. feeling shock.",
            "Then. a hospital room. Here, I he wakes up slowly.",
        ];
        for sample in samples {
            let once = convert(sample);
            assert_eq!(convert(&once), once, "not idempotent for {sample:?}");
        }
    }
}
