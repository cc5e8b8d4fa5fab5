pub mod fixtures {
    use crate::models::domain::question::{AssessmentKind, Question, QuestionKind};
    use crate::services::assessment_flow::AssessmentFlow;

    /// Creates `count` essay questions with predictable prompts and
    /// expected answers ("prompt N" / "expected N"), 10 points each.
    pub fn test_questions(count: u32) -> Vec<Question> {
        (1..=count)
            .map(|id| Question {
                id,
                prompt: format!("prompt {}", id),
                kind: QuestionKind::Essay,
                options: Vec::new(),
                expected_answer: format!("expected {}", id),
                explanation: String::new(),
                time_limit_secs: Some(60),
                points: 10,
            })
            .collect()
    }

    /// An aptitude flow in `ready` with `count` questions and an hour on
    /// the clock.
    pub fn ready_flow(count: u32) -> AssessmentFlow {
        let mut flow = AssessmentFlow::new(AssessmentKind::Aptitude, 3600);
        flow.questions_loaded(test_questions(count));
        flow
    }

    /// A ready flow with every question answered correctly.
    pub fn answered_flow(count: u32) -> AssessmentFlow {
        let mut flow = ready_flow(count);
        for id in 1..=count {
            flow.record_answer(id, format!("expected {}", id))
                .expect("fixture answer should record");
        }
        flow
    }
}

pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::models::domain::assessment::FlowPhase;

    #[test]
    fn test_fixtures_test_questions() {
        let questions = test_questions(3);
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].prompt, "prompt 1");
        assert_eq!(questions[2].expected_answer, "expected 3");
        assert!(questions.iter().all(|q| q.points == 10));
    }

    #[test]
    fn test_fixtures_answered_flow_scores_fully() {
        let flow = answered_flow(4);
        assert_eq!(flow.phase(), FlowPhase::Ready);
        assert_eq!(flow.answered_count(), 4);
        assert_eq!(flow.local_score(), 40);
    }
}
