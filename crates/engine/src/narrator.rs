use crate::person;
use crate::sanitize::clean_strict;
use crate::scene::Scene;

/// Where a scene sits among the scenes chosen for narration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenePosition {
    First,
    Middle,
    Last,
}

impl ScenePosition {
    /// `index` is 1-based within `total` selected scenes.
    pub fn of(index: usize, total: usize) -> Self {
        if index <= 1 {
            ScenePosition::First
        } else if index >= total {
            ScenePosition::Last
        } else {
            ScenePosition::Middle
        }
    }

    fn opening(self) -> &'static str {
        match self {
            ScenePosition::First => "I find myself",
            ScenePosition::Middle => "Then",
            ScenePosition::Last => "Finally",
        }
    }
}

/// Render one scene as a short first-person sentence group.
pub fn narrate_scene(scene: &Scene, index: usize, total: usize) -> String {
    let position = ScenePosition::of(index, total);
    let mut clauses = vec![position.opening().to_string()];

    let setting = clean_strict(&scene.setting);
    if !setting.is_empty() {
        clauses.push(setting.to_lowercase());
    }

    let visual = clean_strict(&scene.visual);
    if !visual.is_empty() {
        clauses.push(format!("where {}", describe_visual(&visual)));
    }

    let action = clean_strict(&scene.action);
    if !action.is_empty() {
        let rest = action.strip_prefix("I ").unwrap_or(&action);
        clauses.push(format!("Here, I {}", rest.to_lowercase()));
    }

    let mood = clean_strict(&scene.mood);
    if !mood.is_empty() {
        clauses.push(format!("feeling {}", mood.to_lowercase()));
    }

    let text = format!("{}.", clauses.join(". "));
    let cleaned = clean_strict(&person::convert(&text));
    if cleaned.is_empty() {
        format!("{}.", position.opening())
    } else {
        cleaned
    }
}

fn describe_visual(visual: &str) -> String {
    let lower = visual.to_lowercase();
    if lower.starts_with("close up") || lower.starts_with("closeup") {
        format!("I notice {}", lower)
    } else {
        format!("I see {}", lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        Scene {
            number: 1,
            name: "Impact".to_string(),
            visual: "A person falling down stairs".to_string(),
            setting: "A narrow stairwell".to_string(),
            action: "They grab the railing".to_string(),
            mood: "Shock".to_string(),
            transition: String::new(),
        }
    }

    #[test]
    fn test_position_openings() {
        assert_eq!(ScenePosition::of(1, 1), ScenePosition::First);
        assert_eq!(ScenePosition::of(1, 3), ScenePosition::First);
        assert_eq!(ScenePosition::of(2, 3), ScenePosition::Middle);
        assert_eq!(ScenePosition::of(3, 3), ScenePosition::Last);
    }

    #[test]
    fn test_full_scene() {
        let text = narrate_scene(&scene(), 1, 3);
        assert_eq!(
            text,
            "I find myself. a narrow stairwell. where I see a person falling down stairs. \
             Here, I grab the railing. feeling shock."
        );
    }

    #[test]
    fn test_close_up_and_first_person_action() {
        let scene = Scene {
            visual: "Close-up of a trembling hand".to_string(),
            action: "I breathe slowly".to_string(),
            ..Scene::new(2, "Hands")
        };
        let text = narrate_scene(&scene, 2, 3);
        assert!(text.starts_with("Then."));
        assert!(text.contains("where I notice close up of a trembling hand"));
        assert!(text.contains("Here, I breathe slowly"));
    }

    #[test]
    fn test_empty_scene_still_yields_sentence() {
        assert_eq!(narrate_scene(&Scene::new(1, ""), 1, 1), "I find myself.");
        assert_eq!(narrate_scene(&Scene::new(2, ""), 2, 3), "Then.");
        assert_eq!(narrate_scene(&Scene::new(3, ""), 3, 3), "Finally.");
    }

    #[test]
    fn test_artifact_fields_are_dropped() {
        let scene = Scene {
            visual: "ti".to_string(),
            mood: "tmy".to_string(),
            ..Scene::new(1, "")
        };
        assert_eq!(narrate_scene(&scene, 3, 3), "Finally.");
    }
}
