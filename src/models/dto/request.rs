use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::question::AssessmentKind;

// ---------------------------------------------------------------------------
// Inbound requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartAssessmentRequest {
    pub kind: AssessmentKind,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RestartAssessmentRequest {
    pub kind: AssessmentKind,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnswerRequest {
    #[validate(range(min = 1))]
    pub question_id: u32,

    #[validate(length(max = 20000))]
    pub answer: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NavigateRequest {
    Next,
    Previous,
    Goto { index: usize },
}

// ---------------------------------------------------------------------------
// Upstream quiz API payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct GenerateMcqRequest {
    pub subject: String,
    pub difficulty: String,
    pub count: u32,
}

impl Default for GenerateMcqRequest {
    fn default() -> Self {
        Self {
            subject: "programming".to_string(),
            difficulty: "medium".to_string(),
            count: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateChallengeRequest {
    pub difficulty: String,
    pub language: String,
    pub topic: String,
}

impl Default for GenerateChallengeRequest {
    fn default() -> Self {
        Self {
            difficulty: "medium".to_string(),
            language: "python".to_string(),
            topic: "algorithms".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionAnswerPair {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluateAptitudeRequest {
    pub questions: Vec<QuestionAnswerPair>,
    pub answers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluateCodeRequest {
    pub code: String,
    pub language: String,
    pub problem: String,
}
