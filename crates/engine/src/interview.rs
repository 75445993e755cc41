//! The four-question interview: fixed opener, keyword-driven follow-ups and
//! the short acknowledgements shown between answers.

use serde::{Deserialize, Serialize};

pub const TOTAL_QUESTIONS: usize = 4;

pub const FIRST_QUESTION: &str = "What was the life-changing moment you experienced?";

const READY_PHRASES: &[&str] = &["ready", "start", "begin", "tell my story", "i'm ready"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    CoreExperience,
    ContextualSetup,
    ContextualAftermath,
    ContextualTransformation,
}

impl QuestionCategory {
    pub fn for_number(number: usize) -> Option<Self> {
        match number {
            1 => Some(QuestionCategory::CoreExperience),
            2 => Some(QuestionCategory::ContextualSetup),
            3 => Some(QuestionCategory::ContextualAftermath),
            4 => Some(QuestionCategory::ContextualTransformation),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionCategory::CoreExperience => "core_experience",
            QuestionCategory::ContextualSetup => "contextual_setup",
            QuestionCategory::ContextualAftermath => "contextual_aftermath",
            QuestionCategory::ContextualTransformation => "contextual_transformation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: usize,
    pub text: String,
    pub category: QuestionCategory,
    pub order: usize,
}

impl Question {
    /// Question list for a new session; follow-up texts are filled in once
    /// the first answer is known.
    pub fn initial_set() -> Vec<Question> {
        (1..=TOTAL_QUESTIONS)
            .filter_map(|n| {
                QuestionCategory::for_number(n).map(|category| Question {
                    id: n,
                    text: if n == 1 {
                        FIRST_QUESTION.to_string()
                    } else {
                        String::new()
                    },
                    category,
                    order: n,
                })
            })
            .collect()
    }
}

/// A question paired with the answer given to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
    pub category: String,
}

/// Kind of experience described in the first answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Accident,
    Loss,
    Career,
    Relationship,
    Move,
    General,
}

impl Topic {
    pub fn detect(answer: &str) -> Self {
        let lower = answer.to_lowercase();
        let table: [(Topic, &[&str]); 5] = [
            (Topic::Accident, &["fell", "fall", "accident", "crash", "collision"]),
            (Topic::Loss, &["lost", "death", "died", "passed away"]),
            (Topic::Career, &["job", "work", "career", "fired", "quit", "resigned"]),
            (Topic::Relationship, &["relationship", "breakup", "divorce", "marriage", "love"]),
            (Topic::Move, &["move", "moved", "relocated", "travel", "journey"]),
        ];
        table
            .iter()
            .find(|(_, keywords)| contains_any(&lower, keywords))
            .map(|(topic, _)| *topic)
            .unwrap_or(Topic::General)
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Whether a chat message signals the user wants to begin.
pub fn is_ready_message(message: &str) -> bool {
    contains_any(&message.to_lowercase(), READY_PHRASES)
}

/// Follow-up question `number` (2..=4) shaped by the first answer.
/// Empty for other numbers or when there is no first answer yet.
pub fn contextual_question(number: usize, first_answer: Option<&str>) -> String {
    let Some(first_answer) = first_answer else {
        return String::new();
    };
    let topic = Topic::detect(first_answer);
    let text = match (number, topic) {
        (2, Topic::Accident) => "I can only imagine how frightening that must have been. Before we continue, I want you to know this is a safe space to share whatever feels right to you. What led up to that moment? Were you rushing somewhere, feeling distracted, or was it just an ordinary day that suddenly changed? Take your time with this.",
        (2, Topic::Loss) => "Thank you for trusting me with something so deeply personal. Loss can be one of the most profound experiences we face. What led up to that moment? What was happening in your life before this loss occurred? I'm here to listen, and there's no rush.",
        (2, Topic::Career) => "Career changes can be both exciting and terrifying. I can hear how significant this moment was for you. What led up to that moment? What was happening at work or in your career before this change? How are you feeling as you share this?",
        (2, Topic::Relationship) => "Relationships touch the deepest parts of who we are. Thank you for sharing something so meaningful. What led up to that moment? What was happening in your relationship before this change? I'm here to listen with compassion.",
        (2, Topic::Move) => "Life changes like moving can be both exciting and overwhelming. What led up to that moment? What circumstances led to this change in your life? Take your time to share whatever feels important to you.",
        (2, Topic::General) => "Thank you for sharing that with me. I can hear how significant this moment was for you. What led up to that moment? What was happening in your life before this experience occurred? There's no right or wrong way to answer this.",
        (3, Topic::Accident) => "That must have been such a disorienting and jarring few moments. How are you feeling as you share this? What happened right after you fell? How did you feel — physically and emotionally — in those first moments? Did someone help you? It's okay if this brings up difficult emotions.",
        (3, Topic::Loss) => "I can only imagine how overwhelming those first moments must have been. How are you doing as you share this? What happened right after you learned about this loss? How did you feel in those first moments? Who was there with you? Take breaks whenever you need to.",
        (3, Topic::Career) => "Career changes can feel like your whole world is shifting. How are you feeling about sharing this? What happened right after this career change? How did you feel in those first moments? What did you do next? I'm here to listen without judgment.",
        (3, Topic::Relationship) => "Relationship changes can feel like the ground is moving beneath you. How are you feeling as you share this? What happened right after this relationship change? How did you feel in those first moments? What did you do next? Your feelings are completely valid.",
        (3, Topic::Move) => "Big life changes can be both exciting and overwhelming. How are you feeling about sharing this? What happened right after this change? How did you feel in those first moments? What was it like to be in this new situation? Take your time.",
        (3, Topic::General) => "Thank you for continuing to share your story with me. How are you feeling as we explore this? What happened right after this experience? How did you feel in those first moments? What was going through your mind? There's no rush, and we can pause anytime.",
        (4, Topic::Accident) => "I can hear the strength it took to get through that experience. How are you feeling as we near the end of our conversation? How did this moment change you? Did it shift how you think, act, or feel in your daily life? Maybe it made you more careful or more aware of your surroundings? Your growth is beautiful to witness.",
        (4, Topic::Loss) => "Thank you for trusting me with something so deeply personal. How are you feeling as we explore this? How did this loss change you? Did it shift how you think about life, relationships, or what matters most to you? Your courage in sharing this is inspiring.",
        (4, Topic::Career) => "Career changes can be profound teachers. How are you feeling about sharing this journey? How did this career change transform you? Did it shift how you think about work, success, or your life priorities? Your resilience is evident.",
        (4, Topic::Relationship) => "Relationship changes can teach us so much about ourselves. How are you feeling as we explore this? How did this relationship change transform you? Did it shift how you think about love, connection, or what you want in relationships? Your openness is beautiful.",
        (4, Topic::Move) => "Life changes like moving can be incredible catalysts for growth. How are you feeling about sharing this? How did this change transform you? Did it shift how you think about home, belonging, or what you value in life? Your adaptability is inspiring.",
        (4, Topic::General) => "Thank you for sharing your story with such openness and courage. How are you feeling as we explore this final question? How did this experience change you? Did it shift how you think, act, or feel in your daily life? What stayed with you after this moment? Your willingness to reflect deeply is beautiful.",
        _ => "",
    };
    text.to_string()
}

/// Acknowledgement shown after answer `number`.
pub fn contextual_feedback(number: usize, answer: &str) -> String {
    let lower = answer.to_lowercase();
    let text = match number {
        1 => match Topic::detect(answer) {
            Topic::Accident => "Thank you for sharing that with such courage. Falling down the stairs can be incredibly frightening, both physically and emotionally. I'm honored that you're willing to talk about it with me. You're safe now, and we're going to take this story gently, step by step. How are you feeling as you share this?",
            Topic::Loss => "Thank you for trusting me with something so deeply personal. Loss can be one of the most profound experiences we face, and I'm honored that you're willing to talk about this moment with me. Your courage in sharing this is beautiful. How are you feeling as you share this?",
            Topic::Career => "Thank you for sharing that experience with such openness. Career changes can be both exciting and terrifying, and I can hear how significant this moment was for you. Your willingness to reflect on this is inspiring. How are you feeling about sharing this?",
            Topic::Relationship => "Thank you for sharing that with such vulnerability. Relationships touch the deepest parts of who we are, and I can hear how meaningful this moment was for you. Your openness is beautiful. How are you feeling as you share this?",
            Topic::Move | Topic::General => "Thank you for sharing that experience with such courage. I can hear how significant this moment was for you, and I'm honored that you're willing to explore it with me. How are you feeling about sharing this?",
        },
        2 if contains_any(&lower, &["phone", "distracted", "rushing", "hurried"]) => "Thank you for sharing those details — that adds so much emotional weight to the moment. Feeling distracted, being on your phone… it makes the experience even more relatable and human. I can hear how that context made everything feel more intense. How are you feeling as you share this?",
        2 if contains_any(&lower, &["ordinary", "normal", "regular", "typical"]) => "Thank you for sharing that. Sometimes the most profound moments happen on the most ordinary days, and that contrast can make the experience even more powerful. I can hear how unexpected it all was. How are you feeling about sharing this?",
        2 => "Thank you for sharing those details with such thoughtfulness. Understanding what led up to the moment helps us see the full picture of your experience, and I can hear how important that context is. How are you feeling as you share this?",
        3 if contains_any(&lower, &["hurt", "pain", "injured", "bruised"]) => "Thank you for sharing those details. That must've been such a disorienting and jarring few moments — a mix of pain, confusion, and sudden awareness. Those brief moments can feel like they stretch forever, and I can hear how intense that was for you. How are you feeling as you share this?",
        3 if contains_any(&lower, &["help", "helped", "someone", "people"]) => "Thank you for sharing that. It's so important to have people there for us in those difficult moments, and I'm glad you weren't alone. I can hear how much that support meant to you. How are you feeling about sharing this?",
        3 => "Thank you for sharing those details with such openness. Those first moments after something significant happens can be so intense and confusing, and I can hear how overwhelming that was. How are you feeling as you share this?",
        _ => "Thank you for sharing that with me. How are you feeling about our conversation so far?",
    };
    text.to_string()
}
