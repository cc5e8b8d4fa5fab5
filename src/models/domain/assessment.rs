use serde::{Deserialize, Serialize};

/// Lifecycle phase of one assessment flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowPhase {
    Loading,
    Ready,
    Completed,
    Error,
}

/// Verdict from the networked evaluation path. Produced once per
/// submission attempt; a later attempt overwrites any prior result.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct EvaluationResult {
    pub score: u32,
    pub total: u32,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_taken: Option<f64>,
}
