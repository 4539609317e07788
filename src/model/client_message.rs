use serde::{Deserialize, Serialize};

use crate::model::types::QuizConfiguration;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ClientMessage {
    LoadCategories,

    #[serde(rename_all = "camelCase")]
    StartQuiz { config: QuizConfiguration },

    #[serde(rename_all = "camelCase")]
    SelectAnswer { answer: String },

    Advance,
    Abandon,
}
