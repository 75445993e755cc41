use crate::interview::QuestionAnswer;
use crate::sanitize::collapse_whitespace;

const TITLE: &str = "**Storyboard: \"My Turning Point\" – A Personal Story**";

struct SceneTemplate {
    name: &'static str,
    setting: &'static str,
    mood: &'static str,
    transition: &'static str,
}

const TEMPLATES: [SceneTemplate; 4] = [
    SceneTemplate {
        name: "The Moment",
        setting: "An ordinary place that suddenly feels different",
        mood: "Intense and unforgettable",
        transition: "The scene rewinds to what came before",
    },
    SceneTemplate {
        name: "What Led Up To It",
        setting: "Everyday surroundings in soft light",
        mood: "Unaware and ordinary",
        transition: "Time snaps forward to the aftermath",
    },
    SceneTemplate {
        name: "Right After",
        setting: "The same place, now quiet and still",
        mood: "Shaken but present",
        transition: "Days pass in a slow montage",
    },
    SceneTemplate {
        name: "How It Changed Me",
        setting: "Open space with warm morning light",
        mood: "Hopeful and grounded",
        transition: "Fade to white",
    },
];

/// Storyboard text built directly from interview answers, used when the
/// language model is unavailable. Parses like a generated storyboard.
pub fn fallback_storyboard(answers: &[QuestionAnswer]) -> String {
    let mut out = String::from(TITLE);
    out.push('\n');

    let scenes = answers
        .iter()
        .map(|qa| first_sentence(&qa.answer))
        .filter(|sentence| !sentence.is_empty())
        .zip(TEMPLATES.iter());

    for (number, (sentence, template)) in scenes.enumerate() {
        out.push_str(&format!(
            "\n**Scene {}: \"{}\"**\n• **Visual**: {}\n• **Setting**: {}\n• **Mood**: {}\n• **Transition**: {}\n",
            number + 1,
            template.name,
            sentence,
            template.setting,
            template.mood,
            template.transition,
        ));
    }
    out
}

fn first_sentence(answer: &str) -> String {
    let flat = collapse_whitespace(answer);
    let end = flat
        .find(|c| matches!(c, '.' | '!' | '?'))
        .unwrap_or(flat.len());
    flat[..end].trim().to_string()
}
