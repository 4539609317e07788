//! HTTP client for an Open Trivia DB compatible question provider.

use std::time::Duration;

use log::{info, warn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::QuizError;
use crate::model::types::Category;
use crate::resolver::RequestDescriptor;

const CATEGORIES_PATH: &str = "api_category.php";
const QUESTIONS_PATH: &str = "api.php";

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesEnvelope {
    #[serde(rename = "trivia_categories", alias = "categories")]
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionsEnvelope {
    #[serde(rename = "response_code", alias = "responseCode")]
    pub response_code: i64,
    #[serde(default)]
    pub results: Vec<RawQuestion>,
}

/// One question exactly as the provider sends it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawQuestion {
    pub category: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub difficulty: String,
    pub question: String,
    #[serde(alias = "correctAnswer")]
    pub correct_answer: String,
    #[serde(alias = "incorrectAnswers")]
    pub incorrect_answers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TriviaClient {
    client: Client,
    base_url: Url,
}

impl TriviaClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, QuizError> {
        self.base_url
            .join(path)
            .map_err(|e| QuizError::InvalidRequest(format!("bad provider URL: {e}")))
    }

    pub fn questions_url(&self, request: &RequestDescriptor) -> Result<Url, QuizError> {
        let mut url = self.endpoint(QUESTIONS_PATH)?;
        url.query_pairs_mut().extend_pairs(request.query_pairs());
        Ok(url)
    }

    pub async fn categories(&self) -> Result<Vec<Category>, QuizError> {
        let url = self
            .endpoint(CATEGORIES_PATH)
            .map_err(|e| QuizError::CategoryLoadFailed(e.to_string()))?;
        let (status, body) = self
            .get(url)
            .await
            .map_err(|e| QuizError::CategoryLoadFailed(e.to_string()))?;
        if !status.is_success() {
            return Err(QuizError::CategoryLoadFailed(format!(
                "provider answered with status {status}"
            )));
        }
        let envelope: CategoriesEnvelope = serde_json::from_str(&body)
            .map_err(|e| QuizError::CategoryLoadFailed(e.to_string()))?;
        info!("Loaded {} categories", envelope.categories.len());
        Ok(envelope.categories)
    }

    pub async fn questions(&self, request: &RequestDescriptor) -> Result<QuestionsEnvelope, QuizError> {
        let url = self.questions_url(request)?;
        let (status, body) = self.get(url).await?;

        match serde_json::from_str::<QuestionsEnvelope>(&body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if status == StatusCode::TOO_MANY_REQUESTS => Err(QuizError::RateLimited),
            Err(_) if !status.is_success() => Err(QuizError::Transport(format!(
                "provider answered with status {status}"
            ))),
            Err(e) => Err(QuizError::Decoding(e.to_string())),
        }
    }

    async fn get(&self, url: Url) -> Result<(StatusCode, String), QuizError> {
        info!("GET {url}");
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Trivia provider request failed: {e}");
            if e.is_builder() {
                QuizError::InvalidRequest(e.to_string())
            } else {
                QuizError::Transport(e.to_string())
            }
        })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| QuizError::Transport(e.to_string()))?;
        Ok((status, body))
    }
}
