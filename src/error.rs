//! Error types surfaced by the resolver and the session engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures on the configuration/fetch path. The `Display` text is the
/// message shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("Invalid quiz request: {0}")]
    InvalidRequest(String),
    #[error(
        "Not enough questions available for these settings. Try fewer questions or a different category or difficulty."
    )]
    InsufficientQuestions,
    #[error("The trivia service rejected one of the quiz parameters.")]
    InvalidParameter,
    #[error("The trivia session token was not found.")]
    SessionTokenMissing,
    #[error("The trivia session token has run out of questions.")]
    SessionTokenExhausted,
    #[error("Too many requests to the trivia service. Please wait a few seconds and try again.")]
    RateLimited,
    #[error("The trivia service returned an unknown response code {0}.")]
    UnknownResponseCode(i64),
    #[error("Could not read the trivia service response: {0}")]
    Decoding(String),
    #[error("Could not load categories: {0}")]
    CategoryLoadFailed(String),
    #[error("Could not reach the trivia service: {0}")]
    Transport(String),
    #[error("A quiz is already being loaded.")]
    FetchInProgress,
}

impl QuizError {
    /// Map a non-zero provider response code onto the error taxonomy.
    pub fn from_response_code(code: i64) -> Self {
        match code {
            1 => QuizError::InsufficientQuestions,
            2 => QuizError::InvalidParameter,
            3 => QuizError::SessionTokenMissing,
            4 => QuizError::SessionTokenExhausted,
            5 => QuizError::RateLimited,
            other => QuizError::UnknownResponseCode(other),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            QuizError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            QuizError::InsufficientQuestions => ErrorKind::InsufficientQuestions,
            QuizError::InvalidParameter => ErrorKind::InvalidParameter,
            QuizError::SessionTokenMissing => ErrorKind::SessionTokenMissing,
            QuizError::SessionTokenExhausted => ErrorKind::SessionTokenExhausted,
            QuizError::RateLimited => ErrorKind::RateLimited,
            QuizError::UnknownResponseCode(_) => ErrorKind::UnknownResponseCode,
            QuizError::Decoding(_) => ErrorKind::DecodingError,
            QuizError::CategoryLoadFailed(_) => ErrorKind::CategoryLoadFailed,
            QuizError::Transport(_) => ErrorKind::Transport,
            QuizError::FetchInProgress => ErrorKind::FetchInProgress,
        }
    }
}

/// Errors emitted when a session operation is not valid in the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("a quiz needs at least one question")]
    NoQuestions,
    #[error("the quiz is already complete")]
    Completed,
    #[error("select an answer before moving on")]
    NoAnswerSelected,
    #[error("'{0}' is not one of the offered answers")]
    UnknownAnswer(String),
    #[error("no quiz is in progress")]
    NotStarted,
    #[error("a quiz is already in progress")]
    AlreadyRunning,
}

/// Wire discriminant sent with every error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    InvalidRequest,
    InsufficientQuestions,
    InvalidParameter,
    SessionTokenMissing,
    SessionTokenExhausted,
    RateLimited,
    UnknownResponseCode,
    DecodingError,
    CategoryLoadFailed,
    Transport,
    FetchInProgress,
    InvalidMessage,
    InvalidAction,
}

impl From<&SessionError> for ErrorKind {
    fn from(_: &SessionError) -> Self {
        ErrorKind::InvalidAction
    }
}
