pub mod assessment_flow;
pub mod evaluation;
pub mod question_adapter;
pub mod session_store;
