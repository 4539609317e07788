//! Turns a quiz configuration into a question batch.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};

use crate::error::QuizError;
use crate::model::types::{Category, Difficulty, Question, QuizConfiguration};
use crate::provider::{QuestionsEnvelope, RawQuestion, TriviaClient};

/// Transport-level parameters for one question request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub amount: u32,
    pub category: Option<u32>,
    pub difficulty: Difficulty,
    pub question_type: Option<&'static str>,
}

impl RequestDescriptor {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("amount", self.amount.to_string())];
        if let Some(category) = self.category {
            pairs.push(("category", category.to_string()));
        }
        pairs.push(("difficulty", self.difficulty.wire_value().to_string()));
        if let Some(kind) = self.question_type {
            pairs.push(("type", kind.to_string()));
        }
        pairs
    }
}

pub fn build_request(config: &QuizConfiguration) -> RequestDescriptor {
    RequestDescriptor {
        amount: config.question_count,
        category: config.category.as_ref().map(|c| c.id),
        difficulty: config.difficulty_level(),
        question_type: config.question_type.wire_value(),
    }
}

/// Classify a decoded provider envelope. A zero response code with no rows
/// is still a failure.
pub fn classify(envelope: QuestionsEnvelope) -> Result<Vec<Question>, QuizError> {
    match envelope.response_code {
        0 if envelope.results.is_empty() => {
            warn!("Provider reported success but returned no questions");
            Err(QuizError::InsufficientQuestions)
        }
        0 => Ok(envelope
            .results
            .into_iter()
            .enumerate()
            .map(|(id, raw)| into_question(id, raw))
            .collect()),
        code => Err(QuizError::from_response_code(code)),
    }
}

fn into_question(id: usize, raw: RawQuestion) -> Question {
    Question {
        id,
        category: raw.category,
        kind: raw.kind,
        difficulty: raw.difficulty,
        prompt: raw.question,
        correct_answer: raw.correct_answer,
        incorrect_answers: raw.incorrect_answers,
    }
}

/// Per-player resolver. Holds the guard that keeps a second "start" from
/// issuing a duplicate request while the first is outstanding.
#[derive(Debug, Clone)]
pub struct QuizResolver {
    client: TriviaClient,
    in_flight: Arc<AtomicBool>,
}

/// Clears the in-flight flag when the fetch finishes, however it finishes.
#[derive(Debug)]
pub struct FetchGuard(Arc<AtomicBool>);

impl Drop for FetchGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl QuizResolver {
    pub fn new(client: TriviaClient) -> Self {
        Self {
            client,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Category catalog for the configuration screen. Failures are logged
    /// and degrade to an empty list; "any category" still works.
    pub async fn load_categories(&self) -> Vec<Category> {
        match self.client.categories().await {
            Ok(categories) => categories,
            Err(e) => {
                warn!("{e}");
                Vec::new()
            }
        }
    }

    pub async fn fetch_questions(&self, request: &RequestDescriptor) -> Result<Vec<Question>, QuizError> {
        let envelope = self.client.questions(request).await?;
        classify(envelope)
    }

    /// Validate, build and fetch in one step. Returns
    /// `QuizError::FetchInProgress` without touching the network when another
    /// fetch from this resolver has not finished yet.
    pub async fn resolve(&self, config: &QuizConfiguration) -> Result<Vec<Question>, QuizError> {
        let guard = self.begin_fetch()?;
        self.resolve_with(&guard, config).await
    }

    /// Like [`resolve`](Self::resolve) for a caller that already claimed the
    /// fetch slot. The slot stays claimed until the caller drops the guard.
    pub async fn resolve_with(
        &self,
        _guard: &FetchGuard,
        config: &QuizConfiguration,
    ) -> Result<Vec<Question>, QuizError> {
        config.validate()?;
        let request = build_request(config);
        info!("Fetching questions: {request:?}");
        let questions = self.fetch_questions(&request).await?;
        info!("Fetched {} questions", questions.len());
        Ok(questions)
    }

    pub fn begin_fetch(&self) -> Result<FetchGuard, QuizError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| FetchGuard(self.in_flight.clone()))
            .map_err(|_| QuizError::FetchInProgress)
    }
}
