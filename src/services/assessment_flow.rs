use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::domain::assessment::{EvaluationResult, FlowPhase};
use crate::models::domain::question::{AssessmentKind, Question};
use crate::models::dto::response::{AssessmentView, QuestionView};

/// Result of one countdown tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The flow is not in `ready`; the countdown should stop.
    Idle,
    /// Time remains.
    Running,
    /// The countdown hit zero and the flow auto-completed.
    Expired,
}

/// One assessment session's state machine. All mutation happens through
/// discrete transitions; the countdown is driven externally by calling
/// [`AssessmentFlow::tick`] once per second, which keeps every transition
/// here pure and directly testable.
#[derive(Clone, Debug)]
pub struct AssessmentFlow {
    kind: AssessmentKind,
    phase: FlowPhase,
    questions: Vec<Question>,
    current: usize,
    answers: HashMap<u32, String>,
    remaining_secs: u32,
    time_limit_secs: u32,
    score: u32,
    result: Option<EvaluationResult>,
    error: Option<String>,
    started_at: DateTime<Utc>,
}

impl AssessmentFlow {
    pub fn new(kind: AssessmentKind, time_limit_secs: u32) -> Self {
        Self {
            kind,
            phase: FlowPhase::Loading,
            questions: Vec::new(),
            current: 0,
            answers: HashMap::new(),
            remaining_secs: time_limit_secs,
            time_limit_secs,
            score: 0,
            result: None,
            error: None,
            started_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> AssessmentKind {
        self.kind
    }

    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn result(&self) -> Option<&EvaluationResult> {
        self.result.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn answer_for(&self, question_id: u32) -> Option<&str> {
        self.answers.get(&question_id).map(String::as_str)
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// `loading` → `ready`. Resets the cursor, the answer set and the
    /// countdown so a regeneration never inherits stale state.
    pub fn questions_loaded(&mut self, questions: Vec<Question>) {
        self.questions = questions;
        self.current = 0;
        self.answers.clear();
        self.remaining_secs = self.time_limit_secs;
        self.score = 0;
        self.result = None;
        self.error = None;
        self.phase = FlowPhase::Ready;
        self.started_at = Utc::now();
    }

    /// `loading` → `error`, carrying the categorized message.
    pub fn load_failed(&mut self, message: String) {
        self.phase = FlowPhase::Error;
        self.error = Some(message);
    }

    /// Full reset, keeping the configured time limit. Used when the user
    /// picks a different assessment kind or starts fresh.
    pub fn restart(&mut self, kind: AssessmentKind) {
        *self = AssessmentFlow::new(kind, self.time_limit_secs);
    }

    pub fn next(&mut self) -> AppResult<()> {
        self.ensure_ready()?;
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        }
        Ok(())
    }

    pub fn previous(&mut self) -> AppResult<()> {
        self.ensure_ready()?;
        self.current = self.current.saturating_sub(1);
        Ok(())
    }

    /// Jump straight to a question (the question-navigator affordance).
    /// Out-of-range targets clamp to the last question.
    pub fn goto(&mut self, index: usize) -> AppResult<()> {
        self.ensure_ready()?;
        self.current = index.min(self.questions.len().saturating_sub(1));
        Ok(())
    }

    /// Records an answer for a question. Last write wins; the cursor does
    /// not move.
    pub fn record_answer(&mut self, question_id: u32, answer: String) -> AppResult<()> {
        self.ensure_ready()?;
        if !self.questions.iter().any(|q| q.id == question_id) {
            return Err(AppError::NotFound(format!(
                "Question {} is not part of this assessment",
                question_id
            )));
        }
        self.answers.insert(question_id, answer);
        Ok(())
    }

    /// One second of countdown. At zero the flow auto-completes with the
    /// locally computed score, without a manual submit.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != FlowPhase::Ready {
            return TickOutcome::Idle;
        }
        if self.remaining_secs <= 1 {
            self.remaining_secs = 0;
            self.score = self.local_score();
            self.phase = FlowPhase::Completed;
            return TickOutcome::Expired;
        }
        self.remaining_secs -= 1;
        TickOutcome::Running
    }

    /// Shape checks that must pass before any evaluation request leaves the
    /// process. Failure keeps the flow in `ready`.
    pub fn validate_for_submission(&self) -> AppResult<()> {
        self.ensure_ready()?;

        if self.questions.is_empty() {
            return Err(AppError::ValidationError(
                "No questions loaded; nothing to submit".to_string(),
            ));
        }

        if self.answers.len() != self.questions.len() {
            return Err(AppError::ValidationError(format!(
                "Mismatch: {} questions but {} answers",
                self.questions.len(),
                self.answers.len()
            )));
        }

        for question in &self.questions {
            if !question.has_expected_answer() {
                return Err(AppError::ValidationError(format!(
                    "Question {} is missing an expected answer and cannot be scored",
                    question.id
                )));
            }
        }

        Ok(())
    }

    /// Fallback scoring: a question earns its points when the recorded
    /// answer strictly equals the expected one.
    pub fn local_score(&self) -> u32 {
        self.questions
            .iter()
            .filter(|q| self.answer_for(q.id) == Some(q.expected_answer.as_str()))
            .map(|q| q.points)
            .sum()
    }

    /// `ready` → `completed` with the externally computed verdict. A flow
    /// that already left `ready` is finalized; a verdict arriving late is
    /// discarded and `false` is returned.
    pub fn complete_with_result(&mut self, result: EvaluationResult) -> bool {
        if self.phase != FlowPhase::Ready {
            return false;
        }
        self.score = result.score;
        self.result = Some(result);
        self.phase = FlowPhase::Completed;
        true
    }

    pub fn view(
        &self,
        id: Uuid,
        retries_used: u32,
        last_evaluation_error: Option<&str>,
    ) -> AssessmentView {
        let completed = self.phase == FlowPhase::Completed;
        let questions = self
            .questions
            .iter()
            .map(|q| QuestionView {
                id: q.id,
                prompt: q.prompt.clone(),
                kind: q.kind,
                options: q.options.clone(),
                points: q.points,
                time_limit_secs: q.time_limit_secs,
                answered: self.answers.contains_key(&q.id),
                expected_answer: completed.then(|| q.expected_answer.clone()),
                explanation: (completed && !q.explanation.is_empty())
                    .then(|| q.explanation.clone()),
            })
            .collect();

        AssessmentView {
            id,
            kind: self.kind,
            phase: self.phase,
            started_at: self.started_at,
            current_question: self.current,
            total_questions: self.questions.len(),
            answered_count: self.answers.len(),
            remaining_secs: self.remaining_secs,
            score: self.score,
            retries_used,
            result: self.result.clone(),
            error: self
                .error
                .clone()
                .or_else(|| last_evaluation_error.map(str::to_string)),
            questions,
        }
    }

    fn ensure_ready(&self) -> AppResult<()> {
        match self.phase {
            FlowPhase::Ready => Ok(()),
            FlowPhase::Loading => Err(AppError::ValidationError(
                "Assessment is still loading".to_string(),
            )),
            FlowPhase::Completed => Err(AppError::ValidationError(
                "Assessment is already completed".to_string(),
            )),
            FlowPhase::Error => Err(AppError::ValidationError(
                "Assessment failed to load; restart it to try again".to_string(),
            )),
        }
    }
}
