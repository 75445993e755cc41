use anyhow::{anyhow, Result};
use std::time::Duration;
use tracing::debug;

use storycatcher_engine::interview::{QuestionAnswer, TOTAL_QUESTIONS};

use crate::config::Config;

pub const INCOMPLETE_INTERVIEW: &str =
    "I need all four answers to generate your storyboard. Please complete the interview first.";

const MAX_TOKENS: u32 = 1500;
const TEMPERATURE: f64 = 0.8;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const SYSTEM_PROMPT: &str = r#"You are a masterful visual storyteller and storyboard creator who specializes in transforming personal experiences into compelling visual narratives.

CRITICAL: You MUST format your storyboard response EXACTLY as specified in the user's prompt. Follow the exact structure with:
- **Storyboard: "[Title]" – [Subtitle]** header
- **Scene X: "[Scene Name]"** for each scene
- Bullet points (•) for each element (Visual, Setting/Action, Mood, Sound, Transition)
- Proper spacing and formatting
- 4-6 scenes total

Your expertise lies in:
1. **Visual Storytelling**: Creating cinematic scenes with clear visual descriptions
2. **Emotional Resonance**: Capturing the emotional journey through visual elements
3. **Scene Structure**: Breaking stories into meaningful scenes with transitions
4. **Mood & Atmosphere**: Describing lighting, sound, and visual mood
5. **Action & Movement**: Creating dynamic visual sequences

IMPORTANT: Follow the exact formatting template provided in the user prompt. Do not deviate from the specified structure."#;

const SCENE_TEMPLATE_SETTING: &str = "• **Visual**: [Detailed visual description]
• **Setting**: [Location and environment details]
• **Mood**: [Emotional tone and atmosphere]
• **Sound**: [Audio suggestions]
• **Transition**: [How this scene connects to the next]";

const SCENE_TEMPLATE_ACTION: &str = "• **Visual**: [Detailed visual description]
• **Action**: [Key actions and movements]
• **Mood**: [Emotional tone and atmosphere]
• **Sound**: [Audio suggestions]
• **Transition**: [How this scene connects to the next]";

const GUIDELINES: &str = "**Storyboard Guidelines:**
- Use bullet points (•) for each element
- Keep descriptions concise but vivid
- Focus on visual storytelling
- Include specific details from their story
- Create emotional resonance through mood and sound
- Make it suitable for video/animation production

**Requirements:**
- Create 4-6 scenes total
- Each scene should have Visual, Setting/Action, Mood, Sound, and Transition
- Use the person's specific experience details
- Make it visually compelling and emotionally resonant
- Format exactly as shown above with proper spacing and bullet points";

/// Chat-completions client that turns interview answers into a storyboard.
pub struct StoryboardClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl StoryboardClient {
    pub fn new(config: &Config) -> Self {
        StoryboardClient {
            http: reqwest::Client::new(),
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            model: config.openai_model.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn generate_storyboard(&self, answers: &[QuestionAnswer]) -> Result<String> {
        if answers.len() < TOTAL_QUESTIONS {
            return Ok(INCOMPLETE_INTERVIEW.to_string());
        }
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("OPENAI_API_KEY environment variable is not set"))?;

        let prompt = storyboard_prompt(&format_answers_for_prompt(answers));
        debug!("Requesting storyboard from {} ({} chars of prompt)", self.model, prompt.len());

        let response = self
            .http
            .post(&format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [
                    { "role": "system", "content": SYSTEM_PROMPT },
                    { "role": "user", "content": prompt }
                ],
                "max_tokens": MAX_TOKENS,
                "temperature": TEMPERATURE
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("OpenAI API error: {} - {}", status, error_text));
        }

        let body: serde_json::Value = response.json().await?;
        extract_content(&body)
    }
}

fn extract_content(body: &serde_json::Value) -> Result<String> {
    let content = body
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::trim)
        .unwrap_or_default();

    if content.is_empty() {
        Err(anyhow!("Invalid response format: missing choices[0].message.content"))
    } else {
        Ok(content.to_string())
    }
}

pub fn format_answers_for_prompt(answers: &[QuestionAnswer]) -> String {
    answers
        .iter()
        .enumerate()
        .map(|(i, qa)| format!("Question {}: {}\nAnswer: {}\n\n", i + 1, qa.question, qa.answer))
        .collect()
}

fn storyboard_prompt(formatted_answers: &str) -> String {
    let mut scenes = String::new();
    for n in 1..=6 {
        let body = if n % 2 == 1 { SCENE_TEMPLATE_SETTING } else { SCENE_TEMPLATE_ACTION };
        let body = if n == 6 {
            body.replace("[How this scene connects to the next]", "[Conclusion or final transition]")
        } else {
            body.to_string()
        };
        scenes.push_str(&format!("**Scene {}: \"[Scene Name]\"**\n{}\n\n", n, body));
    }

    format!(
        "\nBased on the following personal interview responses, create a visual storyboard that brings this person's transformative experience to life:\n\n{}\n**IMPORTANT FORMATTING REQUIREMENTS:**\n\nCreate a storyboard with this EXACT structure and formatting:\n\n**Storyboard: \"[Title]\" – [Subtitle]**\n\n{}{}\n",
        formatted_answers, scenes, GUIDELINES
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qa(question: &str, answer: &str) -> QuestionAnswer {
        QuestionAnswer {
            question: question.to_string(),
            answer: answer.to_string(),
            category: "core_experience".to_string(),
        }
    }

    #[test]
    fn test_format_answers() {
        let formatted = format_answers_for_prompt(&[qa("Q one?", "A one"), qa("Q two?", "A two")]);
        assert_eq!(formatted, "Question 1: Q one?\nAnswer: A one\n\nQuestion 2: Q two?\nAnswer: A two\n\n");
    }

    #[test]
    fn test_prompt_contains_six_scene_templates() {
        let prompt = storyboard_prompt("Question 1: x\nAnswer: y\n\n");
        for n in 1..=6 {
            assert!(prompt.contains(&format!("**Scene {}: \"[Scene Name]\"**", n)));
        }
        assert_eq!(prompt.matches("[Conclusion or final transition]").count(), 1);
        assert!(prompt.contains("Answer: y"));
    }

    #[test]
    fn test_extract_content() {
        let body = serde_json::json!({
            "choices": [{ "message": { "content": "  **Storyboard: \"X\"**  " } }]
        });
        assert_eq!(extract_content(&body).unwrap(), "**Storyboard: \"X\"**");
        assert!(extract_content(&serde_json::json!({ "choices": [] })).is_err());
    }

    #[tokio::test]
    async fn test_incomplete_interview_short_circuits() {
        let config = Config::from_lookup(|_| None).unwrap();
        let client = StoryboardClient::new(&config);
        let reply = client.generate_storyboard(&[qa("Q", "A")]).await.unwrap();
        assert_eq!(reply, INCOMPLETE_INTERVIEW);
    }

    #[tokio::test]
    async fn test_missing_key_is_an_error() {
        let config = Config::from_lookup(|_| None).unwrap();
        let client = StoryboardClient::new(&config);
        let answers: Vec<QuestionAnswer> = (0..4).map(|_| qa("Q", "A")).collect();
        assert!(!client.is_configured());
        assert!(client.generate_storyboard(&answers).await.is_err());
    }
}
