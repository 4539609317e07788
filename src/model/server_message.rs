use log::{error, info};
use serde::{Deserialize, Serialize};
use tokio_tungstenite::tungstenite::Message;

use crate::error::{ErrorKind, QuizError, SessionError};
use crate::model::types::Category;
use crate::server::Tx;
use crate::session::{Phase, Summary};

// === Session View ===
// What the presentation layer renders. `value` fields are the raw provider
// strings to send back with `selectAnswer`; `text` fields are for display.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    pub value: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: usize,
    pub category: String,
    pub kind: String,
    pub difficulty: String,
    pub prompt: String,
    pub prompt_text: String,
    pub answers: Vec<AnswerOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub question_number: usize,
    pub total_questions: usize,
    pub question: QuestionView,
    pub selected_answer: Option<String>,
    pub score: usize,
    pub time_remaining_seconds: u32,
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ServerMessage {
    Categories {
        categories: Vec<Category>,
    },
    Loading,
    SessionState {
        state: SessionView,
    },
    #[serde(rename_all = "camelCase")]
    TimerTick {
        seconds_remaining: u32,
    },
    SessionAbandoned,
    Error {
        kind: ErrorKind,
        message: String,
    },
}

impl ServerMessage {
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        ServerMessage::Error {
            kind,
            message: message.into(),
        }
    }
}

impl From<&QuizError> for ServerMessage {
    fn from(err: &QuizError) -> Self {
        ServerMessage::error(err.kind(), err.to_string())
    }
}

impl From<&SessionError> for ServerMessage {
    fn from(err: &SessionError) -> Self {
        ServerMessage::error(ErrorKind::from(err), err.to_string())
    }
}

pub fn send_msg(tx: &Tx, msg: ServerMessage) {
    info!("Sending server message: {msg:?}");
    let msg = serde_json::to_string(&msg).unwrap_or_else(|e| {
        format!("Catastrophic! Serde error when trying to serialize serverside: {e}")
    });
    tx.send(Message::text(&msg)).unwrap_or_else(|e| {
        error!("Sending server message through channel failed: {e}");
        error!("Tried to send message: {msg}");
    })
}
