use crate::models::domain::question::{Question, QuestionKind};
use crate::models::dto::response::{ChallengeResponse, GeneratedQuestionsResponse};

pub const APTITUDE_POINTS: u32 = 10;
pub const MCQ_POINTS: u32 = 10;
pub const CODING_POINTS: u32 = 50;

const QUESTION_TIME_LIMIT_SECS: u32 = 60;
const CODING_TIME_LIMIT_SECS: u32 = 1800;

const CODING_FALLBACK_PROMPT: &str = "Solve the coding challenge";

/// Aptitude generation returns free-text question/answer pairs; they are
/// captured as essay questions.
pub fn from_aptitude(response: GeneratedQuestionsResponse) -> Vec<Question> {
    response
        .questions
        .into_iter()
        .enumerate()
        .map(|(index, raw)| Question {
            id: index as u32 + 1,
            prompt: raw.question,
            kind: QuestionKind::Essay,
            options: Vec::new(),
            expected_answer: raw.answer.unwrap_or_default(),
            explanation: String::new(),
            time_limit_secs: Some(QUESTION_TIME_LIMIT_SECS),
            points: APTITUDE_POINTS,
        })
        .collect()
}

pub fn from_mcq(response: GeneratedQuestionsResponse) -> Vec<Question> {
    response
        .questions
        .into_iter()
        .enumerate()
        .map(|(index, raw)| Question {
            id: index as u32 + 1,
            prompt: raw.question,
            kind: QuestionKind::MultipleChoice,
            options: raw.options,
            expected_answer: raw.answer.unwrap_or_default(),
            explanation: String::new(),
            time_limit_secs: Some(QUESTION_TIME_LIMIT_SECS),
            points: MCQ_POINTS,
        })
        .collect()
}

/// Coding generation returns a single challenge. The prompt falls back
/// from `problem` to `description`, treating blank strings as absent.
pub fn from_challenge(response: ChallengeResponse) -> Vec<Question> {
    let prompt = response
        .problem
        .filter(|p| !p.trim().is_empty())
        .or(response.description.filter(|d| !d.trim().is_empty()))
        .unwrap_or_else(|| CODING_FALLBACK_PROMPT.to_string());

    vec![Question {
        id: 1,
        prompt,
        kind: QuestionKind::Coding,
        options: Vec::new(),
        expected_answer: response.solution.unwrap_or_default(),
        explanation: response.explanation.unwrap_or_default(),
        time_limit_secs: Some(CODING_TIME_LIMIT_SECS),
        points: CODING_POINTS,
    }]
}
