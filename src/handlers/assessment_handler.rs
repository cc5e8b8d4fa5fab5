use std::sync::Arc;

use actix_web::{delete, get, post, web, HttpResponse};
use log::{info, warn};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::{AppError, AppResult},
    models::{
        domain::question::{AssessmentKind, Question},
        dto::request::{
            AnswerRequest, EvaluateAptitudeRequest, EvaluateCodeRequest, GenerateChallengeRequest,
            GenerateMcqRequest, NavigateRequest, RestartAssessmentRequest, StartAssessmentRequest,
        },
        dto::response::AssessmentView,
    },
    services::{
        evaluation::{build_aptitude_request, build_code_request, retry_delay},
        question_adapter,
        session_store::AssessmentSession,
    },
};

#[get("/health")]
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Creates a session and loads questions for the requested kind. The
/// session is returned even when generation fails, carrying the error
/// phase so the client can offer a restart.
#[post("/api/assessments")]
async fn start_assessment(
    state: web::Data<AppState>,
    request: web::Json<StartAssessmentRequest>,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let session = state
        .sessions
        .create(request.kind, state.config.assessment_time_limit_secs)
        .await;

    load_questions(&state, &session).await;
    Ok(HttpResponse::Created().json(snapshot(&session).await))
}

#[get("/api/assessments/{id}")]
async fn get_assessment(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let session = state.sessions.get(*id).await?;
    Ok(HttpResponse::Ok().json(snapshot(&session).await))
}

#[post("/api/assessments/{id}/navigate")]
async fn navigate_assessment(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    request: web::Json<NavigateRequest>,
) -> Result<HttpResponse, AppError> {
    let session = state.sessions.get(*id).await?;
    {
        let mut flow = session.flow.write().await;
        match request.into_inner() {
            NavigateRequest::Next => flow.next()?,
            NavigateRequest::Previous => flow.previous()?,
            NavigateRequest::Goto { index } => flow.goto(index)?,
        }
    }
    Ok(HttpResponse::Ok().json(snapshot(&session).await))
}

#[post("/api/assessments/{id}/answer")]
async fn answer_question(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    request: web::Json<AnswerRequest>,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let session = state.sessions.get(*id).await?;
    let request = request.into_inner();
    session
        .flow
        .write()
        .await
        .record_answer(request.question_id, request.answer)?;
    Ok(HttpResponse::Ok().json(snapshot(&session).await))
}

/// Submits the flow for evaluation. A fresh submission resets the retry
/// budget; at most one evaluation may be outstanding per session.
#[post("/api/assessments/{id}/submit")]
async fn submit_assessment(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let session = state.sessions.get(*id).await?;

    let payload = build_payload(&session).await?;
    session.tracker.lock().await.begin_submit()?;

    evaluate(&state, &session, payload).await?;
    Ok(HttpResponse::Ok().json(snapshot(&session).await))
}

/// Re-runs a failed evaluation with linear backoff: the n-th retry waits
/// n seconds before the request goes out. After three retries the session
/// must be restarted.
#[post("/api/assessments/{id}/retry")]
async fn retry_evaluation(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let session = state.sessions.get(*id).await?;

    let payload = build_payload(&session).await?;
    let retry_number = session.tracker.lock().await.begin_retry()?;

    info!(
        "session {} evaluation retry {} after {:?}",
        session.id,
        retry_number,
        retry_delay(retry_number)
    );
    tokio::time::sleep(retry_delay(retry_number)).await;

    evaluate(&state, &session, payload).await?;
    Ok(HttpResponse::Ok().json(snapshot(&session).await))
}

/// Discards all progress and reloads questions, possibly for a different
/// assessment kind. Countdown, answers and the retry budget all reset.
#[post("/api/assessments/{id}/restart")]
async fn restart_assessment(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    request: web::Json<RestartAssessmentRequest>,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let session = state.sessions.get(*id).await?;

    session.cancel_timer().await;
    session.tracker.lock().await.reset();
    session.flow.write().await.restart(request.kind);

    load_questions(&state, &session).await;
    Ok(HttpResponse::Ok().json(snapshot(&session).await))
}

#[delete("/api/assessments/{id}")]
async fn delete_assessment(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state.sessions.remove(*id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[derive(Debug)]
enum EvaluationPayload {
    Aptitude(EvaluateAptitudeRequest),
    Code(EvaluateCodeRequest),
}

/// Validates the flow and serializes it for the upstream evaluator. The
/// shape checks run before any attempt is booked, so a malformed flow
/// never consumes the retry budget or leaves the session in flight.
async fn build_payload(session: &AssessmentSession) -> AppResult<EvaluationPayload> {
    let flow = session.flow.read().await;
    match flow.kind() {
        AssessmentKind::Coding => Ok(EvaluationPayload::Code(build_code_request(&flow)?)),
        AssessmentKind::Aptitude | AssessmentKind::Mcq => {
            Ok(EvaluationPayload::Aptitude(build_aptitude_request(&flow)?))
        }
    }
}

async fn evaluate(
    state: &AppState,
    session: &Arc<AssessmentSession>,
    payload: EvaluationPayload,
) -> AppResult<()> {
    let outcome = match payload {
        EvaluationPayload::Aptitude(request) => state.quiz_api.evaluate_aptitude(request).await,
        EvaluationPayload::Code(request) => state.quiz_api.evaluate_code(request).await,
    };

    match outcome {
        Ok(outcome) => {
            let applied = session
                .flow
                .write()
                .await
                .complete_with_result(outcome.into());
            if applied {
                session.cancel_timer().await;
            } else {
                warn!(
                    "session {} verdict arrived after finalization; keeping existing state",
                    session.id
                );
            }
            session.tracker.lock().await.finish(None);
            Ok(())
        }
        Err(err) => {
            warn!("session {} evaluation failed: {}", session.id, err);
            session
                .tracker
                .lock()
                .await
                .finish(Some(err.user_message()));
            Err(AppError::Upstream(err))
        }
    }
}

/// Generates questions for the session's kind and transitions the flow to
/// `ready` or `error`. The countdown is armed only on success.
async fn load_questions(state: &AppState, session: &Arc<AssessmentSession>) {
    let kind = session.flow.read().await.kind();
    let generated: Result<Vec<Question>, _> = match kind {
        AssessmentKind::Aptitude => state
            .quiz_api
            .generate_aptitude()
            .await
            .map(question_adapter::from_aptitude),
        AssessmentKind::Mcq => state
            .quiz_api
            .generate_mcq(GenerateMcqRequest::default())
            .await
            .map(question_adapter::from_mcq),
        AssessmentKind::Coding => state
            .quiz_api
            .generate_challenge(GenerateChallengeRequest::default())
            .await
            .map(question_adapter::from_challenge),
    };

    let mut flow = session.flow.write().await;
    match generated {
        Ok(questions) if questions.is_empty() => {
            warn!("session {} received an empty question set", session.id);
            flow.load_failed(
                "The AI service returned no questions. Please try again.".to_string(),
            );
        }
        Ok(questions) => {
            info!(
                "session {} loaded {} {} questions",
                session.id,
                questions.len(),
                kind
            );
            flow.questions_loaded(questions);
            drop(flow);
            Arc::clone(session).arm_timer().await;
        }
        Err(err) => {
            warn!("session {} question generation failed: {}", session.id, err);
            flow.load_failed(err.user_message());
        }
    }
}

async fn snapshot(session: &AssessmentSession) -> AssessmentView {
    let flow = session.flow.read().await;
    let tracker = session.tracker.lock().await;
    flow.view(session.id, tracker.retries(), tracker.last_error())
}
