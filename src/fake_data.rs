// Canned questions and an in-process fake of the trivia provider, for tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::Result;
use axum::{
    Router,
    extract::{RawQuery, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use log::info;
use serde_json::json;
use tokio::net::TcpListener;
use url::Url;

use crate::model::types::{Category, Question};
use crate::provider::{QuestionsEnvelope, RawQuestion};

/// Builds `count` questions, alternating multiple choice and true/false.
/// Some carry HTML entities the way the real provider sends them.
pub fn fake_questions(count: usize) -> Vec<Question> {
    let multiple = [
        (
            "Which planet is known as the &quot;Red Planet&quot;?",
            "Mars",
            ["Venus", "Jupiter", "Saturn"],
        ),
        (
            "Who painted &#039;The Starry Night&#039;?",
            "Vincent van Gogh",
            ["Claude Monet", "Pablo Picasso", "Salvador Dal&iacute;"],
        ),
        (
            "What is the chemical symbol for gold?",
            "Au",
            ["Ag", "Gd", "Go"],
        ),
    ];
    let boolean = [
        ("The Great Wall of China is visible from the Moon with the naked eye.", "False"),
        ("Sound travels faster in water than in air.", "True"),
    ];

    (0..count)
        .map(|id| {
            if id % 2 == 0 {
                let (prompt, correct, incorrect) = multiple[(id / 2) % multiple.len()];
                Question {
                    id,
                    category: "Science &amp; Nature".to_string(),
                    kind: "multiple".to_string(),
                    difficulty: "medium".to_string(),
                    prompt: prompt.to_string(),
                    correct_answer: correct.to_string(),
                    incorrect_answers: incorrect.iter().map(|s| s.to_string()).collect(),
                }
            } else {
                let (prompt, correct) = boolean[(id / 2) % boolean.len()];
                let incorrect = if correct == "True" { "False" } else { "True" };
                Question {
                    id,
                    category: "General Knowledge".to_string(),
                    kind: "boolean".to_string(),
                    difficulty: "easy".to_string(),
                    prompt: prompt.to_string(),
                    correct_answer: correct.to_string(),
                    incorrect_answers: vec![incorrect.to_string()],
                }
            }
        })
        .collect()
}

pub fn fake_categories() -> Vec<Category> {
    [(9, "General Knowledge"), (17, "Science &amp; Nature"), (23, "History")]
        .into_iter()
        .map(|(id, name)| Category {
            id,
            name: name.to_string(),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct FakeResponse {
    pub status: u16,
    pub body: String,
}

impl FakeResponse {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(value: serde_json::Value) -> Self {
        Self::status(200, value.to_string())
    }

    /// A provider envelope with the given response code and questions.
    pub fn questions(response_code: i64, questions: &[Question]) -> Self {
        let envelope = QuestionsEnvelope {
            response_code,
            results: questions
                .iter()
                .map(|q| RawQuestion {
                    category: q.category.clone(),
                    kind: q.kind.clone(),
                    difficulty: q.difficulty.clone(),
                    question: q.prompt.clone(),
                    correct_answer: q.correct_answer.clone(),
                    incorrect_answers: q.incorrect_answers.clone(),
                })
                .collect(),
        };
        Self::json(serde_json::to_value(envelope).unwrap_or_default())
    }

    pub fn categories(categories: &[Category]) -> Self {
        Self::json(json!({ "trivia_categories": categories }))
    }
}

/// Scriptable stand-in for the trivia provider.
#[derive(Debug)]
pub struct FakeProvider {
    categories: Mutex<FakeResponse>,
    questions: Mutex<FakeResponse>,
    delay: Mutex<Duration>,
    question_requests: AtomicUsize,
    last_query: Mutex<Option<String>>,
}

impl FakeProvider {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self {
            categories: Mutex::new(FakeResponse::categories(&fake_categories())),
            questions: Mutex::new(FakeResponse::questions(0, &fake_questions(3))),
            delay: Mutex::new(Duration::ZERO),
            question_requests: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        })
    }

    pub fn set_categories(&self, response: FakeResponse) {
        *self.categories.lock().unwrap_or_else(PoisonError::into_inner) = response;
    }

    pub fn set_questions(&self, response: FakeResponse) {
        *self.questions.lock().unwrap_or_else(PoisonError::into_inner) = response;
    }

    /// Hold every question response back for `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap_or_else(PoisonError::into_inner) = delay;
    }

    pub fn question_requests(&self) -> usize {
        self.question_requests.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<String> {
        self.last_query
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Serve the fake on an ephemeral local port and return its base URL.
    pub async fn serve(self: &Arc<Self>) -> Result<Url> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let router = Router::new()
            .route("/api_category.php", get(serve_categories))
            .route("/api.php", get(serve_questions))
            .with_state(self.clone());

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                log::error!("Fake trivia provider stopped: {e}");
            }
        });
        info!("Fake trivia provider listening on {addr}");
        Ok(Url::parse(&format!("http://{addr}/"))?)
    }
}

fn respond(response: FakeResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], response.body).into_response()
}

async fn serve_categories(State(provider): State<Arc<FakeProvider>>) -> Response {
    let response = provider
        .categories
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    respond(response)
}

async fn serve_questions(
    State(provider): State<Arc<FakeProvider>>,
    RawQuery(query): RawQuery,
) -> Response {
    provider.question_requests.fetch_add(1, Ordering::SeqCst);
    *provider
        .last_query
        .lock()
        .unwrap_or_else(PoisonError::into_inner) = query;

    let delay = *provider.delay.lock().unwrap_or_else(PoisonError::into_inner);
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let response = provider
        .questions
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    respond(response)
}
