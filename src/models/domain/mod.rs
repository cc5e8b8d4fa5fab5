pub mod assessment;
pub mod question;

pub use assessment::{EvaluationResult, FlowPhase};
pub use question::{AssessmentKind, Question, QuestionKind};
