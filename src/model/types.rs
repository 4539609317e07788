use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// Upper bound the trivia provider accepts for a single request.
pub const MAX_QUESTION_COUNT: u32 = 50;

// === Category ===

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: u32,
    pub name: String,
}

// === Difficulty ===
// The configuration screen offers a slider over [0, 2]; the provider only
// understands three discrete levels.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const EASY_UPPER: f64 = 0.67;
    pub const MEDIUM_UPPER: f64 = 1.33;

    /// Map a slider position to a difficulty level. Values that cannot be
    /// ordered (NaN) resolve to `Medium`.
    pub fn from_slider(value: f64) -> Self {
        if value.is_nan() {
            Difficulty::Medium
        } else if value < Self::EASY_UPPER {
            Difficulty::Easy
        } else if value < Self::MEDIUM_UPPER {
            Difficulty::Medium
        } else {
            Difficulty::Hard
        }
    }

    pub fn wire_value(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

// === Question Type ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionType {
    #[default]
    Any,
    MultipleChoice,
    TrueFalse,
}

impl QuestionType {
    /// `None` means the type parameter is left off the request.
    pub fn wire_value(&self) -> Option<&'static str> {
        match self {
            QuestionType::Any => None,
            QuestionType::MultipleChoice => Some("multiple"),
            QuestionType::TrueFalse => Some("boolean"),
        }
    }
}

// === Timer Duration ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerDuration {
    ThirtySeconds,
    #[default]
    OneMinute,
    TwoMinutes,
    FiveMinutes,
    OneHour,
}

impl TimerDuration {
    pub const ALL: [TimerDuration; 5] = [
        TimerDuration::ThirtySeconds,
        TimerDuration::OneMinute,
        TimerDuration::TwoMinutes,
        TimerDuration::FiveMinutes,
        TimerDuration::OneHour,
    ];

    pub fn seconds(&self) -> u32 {
        match self {
            TimerDuration::ThirtySeconds => 30,
            TimerDuration::OneMinute => 60,
            TimerDuration::TwoMinutes => 120,
            TimerDuration::FiveMinutes => 300,
            TimerDuration::OneHour => 3600,
        }
    }
}

// === Quiz Configuration ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizConfiguration {
    pub question_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub difficulty: f64,
    #[serde(default)]
    pub question_type: QuestionType,
    #[serde(default)]
    pub timer_duration: TimerDuration,
}

impl Default for QuizConfiguration {
    fn default() -> Self {
        Self {
            question_count: 10,
            category: None,
            difficulty: 1.0,
            question_type: QuestionType::Any,
            timer_duration: TimerDuration::OneMinute,
        }
    }
}

impl QuizConfiguration {
    /// Reject parameters the provider would refuse before any request goes out.
    pub fn validate(&self) -> Result<(), QuizError> {
        if self.question_count == 0 || self.question_count > MAX_QUESTION_COUNT {
            return Err(QuizError::InvalidRequest(format!(
                "question count must be between 1 and {MAX_QUESTION_COUNT}, got {}",
                self.question_count
            )));
        }
        if !(0.0..=2.0).contains(&self.difficulty) {
            return Err(QuizError::InvalidRequest(format!(
                "difficulty must be between 0 and 2, got {}",
                self.difficulty
            )));
        }
        Ok(())
    }

    pub fn difficulty_level(&self) -> Difficulty {
        Difficulty::from_slider(self.difficulty)
    }
}

// === Question ===
// Text fields hold the provider's raw, entity-encoded strings.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: usize,
    pub category: String,
    pub kind: String,
    pub difficulty: String,
    pub prompt: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
}

impl Question {
    /// Every selectable answer, correct first, in provider order.
    pub fn all_answers(&self) -> impl Iterator<Item = &String> {
        std::iter::once(&self.correct_answer).chain(self.incorrect_answers.iter())
    }

    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }
}
