use std::time::Duration;

use crate::errors::{AppError, AppResult};
use crate::models::dto::request::{
    EvaluateAptitudeRequest, EvaluateCodeRequest, QuestionAnswerPair,
};
use crate::services::assessment_flow::AssessmentFlow;

/// Manual retries allowed after a failed evaluation, beyond the initial
/// submission.
pub const MAX_RETRIES: u32 = 3;

pub const CODING_LANGUAGE: &str = "python";

/// Linear backoff: the n-th retry waits n seconds.
pub fn retry_delay(retry_number: u32) -> Duration {
    Duration::from_millis(u64::from(retry_number) * 1000)
}

/// Tracks evaluation attempts for one session. Enforces two invariants: at
/// most one evaluation request is in flight at a time, and retries stop at
/// [`MAX_RETRIES`].
#[derive(Debug, Default)]
pub struct EvaluationTracker {
    retries: u32,
    in_flight: bool,
    last_error: Option<String>,
}

impl EvaluationTracker {
    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Marks a fresh submission outstanding. A fresh submission resets the
    /// retry budget.
    pub fn begin_submit(&mut self) -> AppResult<()> {
        self.ensure_not_in_flight()?;
        self.retries = 0;
        self.in_flight = true;
        Ok(())
    }

    /// Marks one manual retry outstanding and returns its ordinal, from
    /// which the caller derives the backoff delay.
    pub fn begin_retry(&mut self) -> AppResult<u32> {
        self.ensure_not_in_flight()?;
        if self.retries >= MAX_RETRIES {
            return Err(AppError::ValidationError(
                "Maximum retry attempts reached. Please restart the assessment and try again."
                    .to_string(),
            ));
        }
        self.retries += 1;
        self.in_flight = true;
        Ok(self.retries)
    }

    pub fn finish(&mut self, error: Option<String>) {
        self.in_flight = false;
        self.last_error = error;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn ensure_not_in_flight(&self) -> AppResult<()> {
        if self.in_flight {
            return Err(AppError::Conflict(
                "An evaluation request is already in flight".to_string(),
            ));
        }
        Ok(())
    }
}

/// Serializes the answered aptitude/MCQ flow for evaluation. Validation
/// runs first so no request leaves the process with a bad shape.
pub fn build_aptitude_request(flow: &AssessmentFlow) -> AppResult<EvaluateAptitudeRequest> {
    flow.validate_for_submission()?;

    let questions = flow
        .questions()
        .iter()
        .map(|q| QuestionAnswerPair {
            question: q.prompt.clone(),
            answer: q.expected_answer.clone(),
        })
        .collect();

    let answers = flow
        .questions()
        .iter()
        .map(|q| flow.answer_for(q.id).unwrap_or_default().to_string())
        .collect();

    Ok(EvaluateAptitudeRequest { questions, answers })
}

/// Serializes the coding flow: the recorded solution plus the challenge
/// prompt it answers.
pub fn build_code_request(flow: &AssessmentFlow) -> AppResult<EvaluateCodeRequest> {
    flow.validate_for_submission()?;

    let question = flow.questions().first().ok_or_else(|| {
        AppError::ValidationError("No coding challenge loaded".to_string())
    })?;

    Ok(EvaluateCodeRequest {
        code: flow.answer_for(question.id).unwrap_or_default().to_string(),
        language: CODING_LANGUAGE.to_string(),
        problem: question.prompt.clone(),
    })
}
