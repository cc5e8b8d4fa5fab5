use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_web::{http::Method, test, web, App};
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use ainode_server::{
    app_state::AppState,
    clients::quiz_api::QuizApi,
    config::Config,
    errors::QuizApiError,
    handlers,
    models::dto::request::{
        EvaluateAptitudeRequest, EvaluateCodeRequest, GenerateChallengeRequest, GenerateMcqRequest,
    },
    models::dto::response::{
        ChallengeResponse, EvaluationOutcome, GeneratedQuestionsResponse, RawQuestion,
    },
};

/// Upstream stub that replays queued responses in order. Generation calls
/// of any kind share one queue; evaluation calls share another.
#[derive(Default)]
struct ScriptedQuizApi {
    generations: Mutex<VecDeque<Result<GeneratedQuestionsResponse, QuizApiError>>>,
    challenges: Mutex<VecDeque<Result<ChallengeResponse, QuizApiError>>>,
    evaluations: Mutex<VecDeque<Result<EvaluationOutcome, QuizApiError>>>,
    evaluation_calls: AtomicUsize,
}

impl ScriptedQuizApi {
    fn push_generation(&self, response: Result<GeneratedQuestionsResponse, QuizApiError>) {
        self.generations
            .try_lock()
            .expect("script setup")
            .push_back(response);
    }

    fn push_evaluation(&self, response: Result<EvaluationOutcome, QuizApiError>) {
        self.evaluations
            .try_lock()
            .expect("script setup")
            .push_back(response);
    }

    fn evaluation_calls(&self) -> usize {
        self.evaluation_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuizApi for ScriptedQuizApi {
    async fn generate_aptitude(&self) -> Result<GeneratedQuestionsResponse, QuizApiError> {
        self.generations
            .lock()
            .await
            .pop_front()
            .expect("unscripted generate_aptitude call")
    }

    async fn generate_mcq(
        &self,
        _request: GenerateMcqRequest,
    ) -> Result<GeneratedQuestionsResponse, QuizApiError> {
        self.generations
            .lock()
            .await
            .pop_front()
            .expect("unscripted generate_mcq call")
    }

    async fn generate_challenge(
        &self,
        _request: GenerateChallengeRequest,
    ) -> Result<ChallengeResponse, QuizApiError> {
        self.challenges
            .lock()
            .await
            .pop_front()
            .expect("unscripted generate_challenge call")
    }

    async fn evaluate_aptitude(
        &self,
        _request: EvaluateAptitudeRequest,
    ) -> Result<EvaluationOutcome, QuizApiError> {
        self.evaluation_calls.fetch_add(1, Ordering::SeqCst);
        self.evaluations
            .lock()
            .await
            .pop_front()
            .expect("unscripted evaluate_aptitude call")
    }

    async fn evaluate_code(
        &self,
        _request: EvaluateCodeRequest,
    ) -> Result<EvaluationOutcome, QuizApiError> {
        self.evaluation_calls.fetch_add(1, Ordering::SeqCst);
        self.evaluations
            .lock()
            .await
            .pop_front()
            .expect("unscripted evaluate_code call")
    }
}

fn test_config(time_limit_secs: u32) -> Config {
    Config {
        web_server_host: "127.0.0.1".to_string(),
        web_server_port: 8080,
        // Port 9 (discard) refuses connections, so proxy relays fail fast.
        upstream_base_url: "http://127.0.0.1:9".to_string(),
        allowed_origin: "http://localhost:5173".to_string(),
        upstream_timeout_secs: 2,
        assessment_time_limit_secs: time_limit_secs,
        session_ttl_secs: 7200,
    }
}

fn scripted_state(api: Arc<ScriptedQuizApi>, time_limit_secs: u32) -> AppState {
    AppState::with_api(test_config(time_limit_secs), api).expect("state should build")
}

macro_rules! spawn_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .service(handlers::health_check)
                .service(handlers::start_assessment)
                .service(handlers::get_assessment)
                .service(handlers::navigate_assessment)
                .service(handlers::answer_question)
                .service(handlers::submit_assessment)
                .service(handlers::retry_evaluation)
                .service(handlers::restart_assessment)
                .service(handlers::delete_assessment)
                .service(
                    web::resource("/api/proxy/quiz").route(web::route().to(handlers::proxy_relay)),
                ),
        )
        .await
    };
}

fn questions(count: u32) -> GeneratedQuestionsResponse {
    GeneratedQuestionsResponse {
        questions: (1..=count)
            .map(|n| RawQuestion {
                question: format!("prompt {}", n),
                answer: Some(format!("expected {}", n)),
                options: Vec::new(),
            })
            .collect(),
    }
}

fn passing_outcome() -> EvaluationOutcome {
    EvaluationOutcome {
        score: 40,
        total: 50,
        passed: true,
        time_taken: Some(12.0),
    }
}

macro_rules! start_aptitude {
    ($app:expr) => {{
        let request = test::TestRequest::post()
            .uri("/api/assessments")
            .set_json(json!({ "kind": "aptitude" }))
            .to_request();
        let response = test::call_service($app, request).await;
        assert_eq!(response.status().as_u16(), 201);
        let view: Value = test::read_body_json(response).await;
        view
    }};
}

macro_rules! answer {
    ($app:expr, $id:expr, $question_id:expr, $answer:expr) => {{
        let request = test::TestRequest::post()
            .uri(&format!("/api/assessments/{}/answer", $id))
            .set_json(json!({ "question_id": $question_id, "answer": $answer }))
            .to_request();
        let response = test::call_service($app, request).await;
        assert!(response.status().is_success());
        let view: Value = test::read_body_json(response).await;
        view
    }};
}

#[actix_web::test]
async fn health_endpoint_reports_ok() {
    let api = Arc::new(ScriptedQuizApi::default());
    let app = spawn_app!(scripted_state(api, 3600));

    let request = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn starting_an_assessment_returns_a_ready_flow() {
    let api = Arc::new(ScriptedQuizApi::default());
    api.push_generation(Ok(questions(5)));
    let app = spawn_app!(scripted_state(Arc::clone(&api), 3600));

    let view = start_aptitude!(&app);

    assert_eq!(view["phase"], "ready");
    assert_eq!(view["total_questions"], 5);
    assert_eq!(view["answered_count"], 0);
    assert_eq!(view["kind"], "aptitude");
    assert!(view["questions"][0].get("expected_answer").is_none());
}

#[actix_web::test]
async fn failed_generation_surfaces_an_error_phase() {
    let api = Arc::new(ScriptedQuizApi::default());
    api.push_generation(Err(QuizApiError::ModelUnavailable));
    let app = spawn_app!(scripted_state(Arc::clone(&api), 3600));

    let view = start_aptitude!(&app);

    assert_eq!(view["phase"], "error");
    let message = view["error"].as_str().expect("error message");
    assert!(message.contains("AI Service Error"), "got: {}", message);
}

#[actix_web::test]
async fn answering_twice_keeps_only_the_latest_answer() {
    let api = Arc::new(ScriptedQuizApi::default());
    api.push_generation(Ok(questions(3)));
    let app = spawn_app!(scripted_state(Arc::clone(&api), 3600));

    let view = start_aptitude!(&app);
    let id = view["id"].as_str().expect("session id").to_string();

    let _ = answer!(&app, &id, 1, "first");
    let view = answer!(&app, &id, 1, "second");

    assert_eq!(view["answered_count"], 1);
    assert_eq!(view["questions"][0]["answered"], true);
}

#[actix_web::test]
async fn navigation_clamps_at_both_ends() {
    let api = Arc::new(ScriptedQuizApi::default());
    api.push_generation(Ok(questions(3)));
    let app = spawn_app!(scripted_state(Arc::clone(&api), 3600));

    let view = start_aptitude!(&app);
    let id = view["id"].as_str().expect("session id").to_string();

    let request = test::TestRequest::post()
        .uri(&format!("/api/assessments/{}/navigate", id))
        .set_json(json!({ "action": "previous" }))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(view["current_question"], 0);

    let request = test::TestRequest::post()
        .uri(&format!("/api/assessments/{}/navigate", id))
        .set_json(json!({ "action": "goto", "index": 99 }))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(view["current_question"], 2);
}

#[actix_web::test]
async fn incomplete_submission_is_rejected_without_an_upstream_call() {
    let api = Arc::new(ScriptedQuizApi::default());
    api.push_generation(Ok(questions(5)));
    let app = spawn_app!(scripted_state(Arc::clone(&api), 3600));

    let view = start_aptitude!(&app);
    let id = view["id"].as_str().expect("session id").to_string();

    for question_id in 1..=4 {
        let _ = answer!(&app, &id, question_id, "something");
    }

    let request = test::TestRequest::post()
        .uri(&format!("/api/assessments/{}/submit", id))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = test::read_body_json(response).await;
    let message = body["error"].as_str().expect("error message");
    assert!(
        message.contains("Mismatch: 5 questions but 4 answers"),
        "got: {}",
        message
    );
    assert_eq!(api.evaluation_calls(), 0);
}

#[actix_web::test]
async fn successful_submission_completes_with_the_upstream_verdict() {
    let api = Arc::new(ScriptedQuizApi::default());
    api.push_generation(Ok(questions(2)));
    api.push_evaluation(Ok(passing_outcome()));
    let app = spawn_app!(scripted_state(Arc::clone(&api), 3600));

    let view = start_aptitude!(&app);
    let id = view["id"].as_str().expect("session id").to_string();
    let _ = answer!(&app, &id, 1, "expected 1");
    let _ = answer!(&app, &id, 2, "expected 2");

    let request = test::TestRequest::post()
        .uri(&format!("/api/assessments/{}/submit", id))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, request).await;

    assert_eq!(view["phase"], "completed");
    assert_eq!(view["score"], 40);
    assert_eq!(view["result"]["passed"], true);
    // Completed views reveal the expected answers.
    assert_eq!(view["questions"][0]["expected_answer"], "expected 1");
    assert_eq!(api.evaluation_calls(), 1);
}

#[actix_web::test]
async fn quota_failure_surfaces_as_a_bad_gateway_with_the_quota_message() {
    let api = Arc::new(ScriptedQuizApi::default());
    api.push_generation(Ok(questions(1)));
    api.push_evaluation(Err(QuizApiError::QuotaExceeded));
    let app = spawn_app!(scripted_state(Arc::clone(&api), 3600));

    let view = start_aptitude!(&app);
    let id = view["id"].as_str().expect("session id").to_string();
    let _ = answer!(&app, &id, 1, "expected 1");

    let request = test::TestRequest::post()
        .uri(&format!("/api/assessments/{}/submit", id))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status().as_u16(), 502);
    let body: Value = test::read_body_json(response).await;
    let message = body["error"].as_str().expect("error message");
    assert!(message.contains("API Quota Exceeded"), "got: {}", message);
    assert_eq!(body["kind"], "UPSTREAM_ERROR");

    // The flow stays submittable after the failure.
    let request = test::TestRequest::get()
        .uri(&format!("/api/assessments/{}", id))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(view["phase"], "ready");
}

#[actix_web::test]
async fn retry_waits_at_least_one_second_then_succeeds() {
    let api = Arc::new(ScriptedQuizApi::default());
    api.push_generation(Ok(questions(1)));
    api.push_evaluation(Err(QuizApiError::Server(500)));
    api.push_evaluation(Ok(passing_outcome()));
    let app = spawn_app!(scripted_state(Arc::clone(&api), 3600));

    let view = start_aptitude!(&app);
    let id = view["id"].as_str().expect("session id").to_string();
    let _ = answer!(&app, &id, 1, "expected 1");

    let request = test::TestRequest::post()
        .uri(&format!("/api/assessments/{}/submit", id))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status().as_u16(), 502);

    let started = Instant::now();
    let request = test::TestRequest::post()
        .uri(&format!("/api/assessments/{}/retry", id))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, request).await;

    assert!(
        started.elapsed() >= Duration::from_secs(1),
        "first retry should back off one second"
    );
    assert_eq!(view["phase"], "completed");
    assert_eq!(view["retries_used"], 1);
    assert_eq!(api.evaluation_calls(), 2);
}

#[actix_web::test]
async fn countdown_expiry_auto_completes_the_flow() {
    let api = Arc::new(ScriptedQuizApi::default());
    api.push_generation(Ok(questions(1)));
    let app = spawn_app!(scripted_state(Arc::clone(&api), 1));

    let view = start_aptitude!(&app);
    let id = view["id"].as_str().expect("session id").to_string();
    let _ = answer!(&app, &id, 1, "expected 1");

    tokio::time::sleep(Duration::from_millis(2200)).await;

    let request = test::TestRequest::get()
        .uri(&format!("/api/assessments/{}", id))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, request).await;

    assert_eq!(view["phase"], "completed");
    assert_eq!(view["remaining_secs"], 0);
    // Local scoring applied on expiry: the single correct answer scores.
    assert_eq!(view["score"], 10);
    assert_eq!(api.evaluation_calls(), 0);
}

#[actix_web::test]
async fn deleting_a_session_returns_no_content_then_not_found() {
    let api = Arc::new(ScriptedQuizApi::default());
    api.push_generation(Ok(questions(1)));
    let app = spawn_app!(scripted_state(Arc::clone(&api), 3600));

    let view = start_aptitude!(&app);
    let id = view["id"].as_str().expect("session id").to_string();

    let request = test::TestRequest::delete()
        .uri(&format!("/api/assessments/{}", id))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status().as_u16(), 204);

    let request = test::TestRequest::get()
        .uri(&format!("/api/assessments/{}", id))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status().as_u16(), 404);
}

#[actix_web::test]
async fn proxy_preflight_returns_empty_ok() {
    let api = Arc::new(ScriptedQuizApi::default());
    let app = spawn_app!(scripted_state(api, 3600));

    let request = test::TestRequest::with_uri("/api/proxy/quiz?path=/generate/aptitude")
        .method(Method::OPTIONS)
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status().as_u16(), 200);
    let body = test::read_body(response).await;
    assert!(body.is_empty());
}

#[actix_web::test]
async fn proxy_refuses_methods_outside_the_relay_set() {
    let api = Arc::new(ScriptedQuizApi::default());
    let app = spawn_app!(scripted_state(api, 3600));

    let request = test::TestRequest::with_uri("/api/proxy/quiz?path=/generate/aptitude")
        .method(Method::PATCH)
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status().as_u16(), 405);
}

#[actix_web::test]
async fn proxy_relay_failure_collapses_to_a_uniform_500() {
    let api = Arc::new(ScriptedQuizApi::default());
    let app = spawn_app!(scripted_state(api, 3600));

    let request = test::TestRequest::post()
        .uri("/api/proxy/quiz?path=/generate/aptitude")
        .set_json(json!({}))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body, json!({ "error": "Internal server error" }));
}
