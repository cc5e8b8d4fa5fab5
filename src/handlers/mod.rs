pub mod assessment_handler;
pub mod proxy_handler;

pub use assessment_handler::{
    answer_question, delete_assessment, get_assessment, health_check, navigate_assessment,
    restart_assessment, retry_evaluation, start_assessment, submit_assessment,
};
pub use proxy_handler::proxy_relay;
