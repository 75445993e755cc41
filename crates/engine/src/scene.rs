use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const TITLE_MARKER: &str = "**Storyboard:";
const SCENE_MARKER: &str = "**Scene";

/// One storyboard scene block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub number: usize,
    pub name: String,
    pub visual: String,
    pub setting: String,
    pub action: String,
    pub mood: String,
    pub transition: String,
}

impl Scene {
    pub fn new(number: usize, name: impl Into<String>) -> Self {
        Scene {
            number,
            name: name.into(),
            ..Default::default()
        }
    }

    fn field_mut(&mut self, label: &str) -> Option<&mut String> {
        match label.trim().to_lowercase().as_str() {
            "visual" => Some(&mut self.visual),
            "setting" => Some(&mut self.setting),
            "action" => Some(&mut self.action),
            "mood" => Some(&mut self.mood),
            "transition" => Some(&mut self.transition),
            _ => None,
        }
    }
}

/// Parsed storyboard: display title (possibly empty) and scenes in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storyboard {
    pub title: String,
    pub scenes: Vec<Scene>,
}

impl Storyboard {
    /// Parse LLM storyboard text. Malformed input degrades to empty fields,
    /// never to an error.
    pub fn parse(text: &str) -> Self {
        let title = text
            .lines()
            .find(|line| line.contains(TITLE_MARKER) && line.contains("**"))
            .map(extract_title)
            .unwrap_or_default();

        let mut scenes = Vec::new();
        let mut current: Option<Scene> = None;

        for line in text.lines() {
            let line = line.trim();

            if line.starts_with(SCENE_MARKER) && line.contains(':') {
                if let Some(scene) = current.take() {
                    scenes.push(scene);
                }
                current = Some(parse_scene_header(line, scenes.len() + 1));
                continue;
            }

            let Some(scene) = current.as_mut() else {
                continue;
            };
            if let Some((label, value)) = parse_field_line(line) {
                if let Some(field) = scene.field_mut(&label) {
                    if field.is_empty() {
                        *field = value;
                    } else if !value.is_empty() {
                        field.push(' ');
                        field.push_str(&value);
                    }
                }
            }
        }

        if let Some(scene) = current.take() {
            scenes.push(scene);
        }

        Storyboard { title, scenes }
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(\d+):\s*["“]([^"”]+)["”]"#).expect("valid scene header regex"))
}

fn digits_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("valid digits regex"))
}

fn field_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[•\-*]\s*\*\*([A-Za-z ]+)\*\*\s*:\s*(.*)$").expect("valid field regex")
    })
}

fn quoted_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"["“]([^"”]+)["”]"#).expect("valid quote regex"))
}

/// `**Storyboard: "The Fall" – A Story**` yields `The Fall`.
fn extract_title(line: &str) -> String {
    let raw = line.replace(TITLE_MARKER, "").replace("**", "");
    let raw = raw.trim();

    if let Some(caps) = quoted_regex().captures(raw) {
        let quoted = caps[1].trim();
        if !quoted.is_empty() {
            return quoted.to_string();
        }
    }

    for separator in [" – ", " — ", " - "] {
        if let Some((head, _)) = raw.split_once(separator) {
            let head = head.trim();
            if !head.is_empty() {
                return head.to_string();
            }
        }
    }

    raw.to_string()
}

fn parse_scene_header(line: &str, position: usize) -> Scene {
    if let Some(caps) = header_regex().captures(line) {
        let number = caps[1].parse().unwrap_or(position);
        return Scene::new(number, caps[2].trim());
    }

    // Header without a quoted name: keep whatever ordinal is present.
    let number = digits_regex()
        .find(line)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(position);
    Scene::new(number, "")
}

fn parse_field_line(line: &str) -> Option<(String, String)> {
    let caps = field_regex().captures(line)?;
    Some((caps[1].to_string(), caps[2].trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"**Storyboard: "The Fall" – A Story of Awareness**

**Scene 1: "Ordinary Morning"**
• **Visual**: A person scrolling on a phone at the top of the stairs
• **Setting**: A narrow apartment stairwell
• **Mood**: Distracted, hurried
• **Sound**: Footsteps and a notification ping
• **Transition**: The phone buzzes

**Scene 2: "Impact"**
• **Visual**: Close-up of a hand slipping off the rail
• **Action**: They tumble down the last steps
• **Mood**: Shock
"#;

    #[test]
    fn test_parse_title_and_scenes() {
        let storyboard = Storyboard::parse(SAMPLE);
        assert_eq!(storyboard.title, "The Fall");
        assert_eq!(storyboard.scenes.len(), 2);

        let first = &storyboard.scenes[0];
        assert_eq!(first.number, 1);
        assert_eq!(first.name, "Ordinary Morning");
        assert_eq!(first.setting, "A narrow apartment stairwell");
        assert_eq!(first.transition, "The phone buzzes");
        assert!(first.action.is_empty());

        let second = &storyboard.scenes[1];
        assert_eq!(second.number, 2);
        assert_eq!(second.action, "They tumble down the last steps");
        assert_eq!(second.mood, "Shock");
    }

    #[test]
    fn test_empty_and_unstructured_input() {
        assert!(Storyboard::parse("").is_empty());
        let storyboard = Storyboard::parse("Just some prose about a day.\nAnd another line.");
        assert!(storyboard.title.is_empty());
        assert!(storyboard.scenes.is_empty());
    }

    #[test]
    fn test_header_without_quoted_name() {
        let storyboard = Storyboard::parse("**Scene 4: Aftermath**\n• **Mood**: quiet");
        assert_eq!(storyboard.scenes.len(), 1);
        assert_eq!(storyboard.scenes[0].number, 4);
        assert_eq!(storyboard.scenes[0].name, "");
        assert_eq!(storyboard.scenes[0].mood, "quiet");

        let storyboard = Storyboard::parse("**Scene: untitled**\n**Scene: again**");
        let numbers: Vec<usize> = storyboard.scenes.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn test_fields_outside_scene_are_ignored() {
        let storyboard = Storyboard::parse("• **Visual**: floating\n**Scene 1: \"A\"**");
        assert_eq!(storyboard.scenes.len(), 1);
        assert!(storyboard.scenes[0].visual.is_empty());
    }

    #[test]
    fn test_repeated_label_appends() {
        let storyboard =
            Storyboard::parse("**Scene 1: \"A\"**\n• **Mood**: tense\n- **mood**: hopeful");
        assert_eq!(storyboard.scenes[0].mood, "tense hopeful");
    }

    #[test]
    fn test_title_without_quotes() {
        assert_eq!(extract_title("**Storyboard: Rising Again – Notes**"), "Rising Again");
        assert_eq!(extract_title("**Storyboard: Rising Again**"), "Rising Again");
        assert_eq!(extract_title("**Storyboard:**"), "");
    }

    #[test]
    fn test_curly_quotes_in_header() {
        let storyboard = Storyboard::parse("**Scene 3: “Night Shift”**");
        assert_eq!(storyboard.scenes[0].name, "Night Shift");
    }
}
