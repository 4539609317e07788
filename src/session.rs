//! Quiz session engine: question sequencing, scoring and the countdown.
//!
//! `QuizSession` is a plain state machine. It never touches the clock
//! itself; the owning task calls [`QuizSession::tick`] once per second.

use log::info;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::model::server_message::{AnswerOption, QuestionView, SessionView};
use crate::model::types::{Question, TimerDuration};
use crate::text::decode_entities;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Running,
    Complete,
}

/// Why a session reached `Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompletionReason {
    Finished,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub reason: CompletionReason,
}

impl Summary {
    fn new(score: usize, total: usize, reason: CompletionReason) -> Self {
        Self {
            score,
            total,
            percentage: percentage(score, total),
            reason,
        }
    }
}

/// `round(100 * score / total)`, halves rounding up.
pub fn percentage(score: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((score * 200 + total) / (total * 2)) as u32
}

/// Outcome of a successful `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    NextQuestion { correct: bool },
    Completed { correct: bool },
}

/// Outcome of a timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running { seconds_remaining: u32 },
    Expired,
    /// The session was already complete; nothing changed.
    Ignored,
}

/// Build a uniformly shuffled answer order for a question. The question is
/// left untouched.
pub fn shuffle_answers<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> Vec<String> {
    let mut answers: Vec<String> = question.all_answers().cloned().collect();
    answers.shuffle(rng);
    answers
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<Question>,
    current_index: usize,
    score: usize,
    selected_answer: Option<String>,
    shuffled_answers: Vec<String>,
    time_remaining: u32,
    phase: Phase,
    summary: Option<Summary>,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>, duration: TimerDuration) -> Result<Self, SessionError> {
        Self::with_rng(questions, duration, &mut rand::rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(
        questions: Vec<Question>,
        duration: TimerDuration,
        rng: &mut R,
    ) -> Result<Self, SessionError> {
        let first = questions.first().ok_or(SessionError::NoQuestions)?;
        let shuffled_answers = shuffle_answers(first, rng);
        Ok(Self {
            questions,
            current_index: 0,
            score: 0,
            selected_answer: None,
            shuffled_answers,
            time_remaining: duration.seconds(),
            phase: Phase::Running,
            summary: None,
        })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn selected_answer(&self) -> Option<&str> {
        self.selected_answer.as_deref()
    }

    pub fn shuffled_answers(&self) -> &[String] {
        &self.shuffled_answers
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn summary(&self) -> Option<Summary> {
        self.summary
    }

    fn ensure_running(&self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Running => Ok(()),
            Phase::Complete => Err(SessionError::Completed),
        }
    }

    /// Record the player's choice for the current question. The last choice
    /// before advancing wins.
    pub fn select_answer(&mut self, answer: &str) -> Result<(), SessionError> {
        self.ensure_running()?;
        if !self.shuffled_answers.iter().any(|a| a == answer) {
            return Err(SessionError::UnknownAnswer(answer.to_string()));
        }
        self.selected_answer = Some(answer.to_string());
        Ok(())
    }

    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        self.advance_with(&mut rand::rng())
    }

    /// Score the current selection and move on, or complete the session on
    /// the last question.
    pub fn advance_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Advance, SessionError> {
        self.ensure_running()?;
        let selected = self
            .selected_answer
            .as_deref()
            .ok_or(SessionError::NoAnswerSelected)?;

        // Compared against the raw provider string, not the decoded text.
        let correct = self.current_question().is_correct(selected);
        if correct {
            self.score += 1;
        }

        if self.current_index + 1 == self.questions.len() {
            self.complete(CompletionReason::Finished);
            return Ok(Advance::Completed { correct });
        }

        self.current_index += 1;
        self.selected_answer = None;
        self.shuffled_answers = shuffle_answers(&self.questions[self.current_index], rng);
        Ok(Advance::NextQuestion { correct })
    }

    /// One elapsed second. Running out of time completes the session
    /// without scoring the question in progress.
    pub fn tick(&mut self) -> Tick {
        if self.is_complete() {
            return Tick::Ignored;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            self.complete(CompletionReason::TimedOut);
            return Tick::Expired;
        }
        Tick::Running {
            seconds_remaining: self.time_remaining,
        }
    }

    fn complete(&mut self, reason: CompletionReason) {
        self.phase = Phase::Complete;
        let summary = Summary::new(self.score, self.questions.len(), reason);
        info!(
            "Quiz complete ({reason:?}): {}/{} ({}%)",
            summary.score, summary.total, summary.percentage
        );
        self.summary = Some(summary);
    }

    /// Snapshot for the presentation layer.
    pub fn to_view(&self) -> SessionView {
        let question = self.current_question();
        SessionView {
            question_number: self.current_index + 1,
            total_questions: self.questions.len(),
            question: QuestionView {
                id: question.id,
                category: decode_entities(&question.category),
                kind: question.kind.clone(),
                difficulty: question.difficulty.clone(),
                prompt: question.prompt.clone(),
                prompt_text: decode_entities(&question.prompt),
                answers: self
                    .shuffled_answers
                    .iter()
                    .map(|value| AnswerOption {
                        value: value.clone(),
                        text: decode_entities(value),
                    })
                    .collect(),
            },
            selected_answer: self.selected_answer.clone(),
            score: self.score,
            time_remaining_seconds: self.time_remaining,
            phase: self.phase,
            summary: self.summary,
        }
    }
}
