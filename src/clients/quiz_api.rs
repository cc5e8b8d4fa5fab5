use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::errors::QuizApiError;
use crate::models::dto::request::{
    EvaluateAptitudeRequest, EvaluateCodeRequest, GenerateChallengeRequest, GenerateMcqRequest,
};
use crate::models::dto::response::{
    ChallengeResponse, EvaluationOutcome, GeneratedQuestionsResponse,
};

/// The external quiz/AI service consumed through named operations. All
/// generation and evaluation traffic goes through this seam so handlers can
/// be exercised against scripted implementations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizApi: Send + Sync {
    async fn generate_aptitude(&self) -> Result<GeneratedQuestionsResponse, QuizApiError>;

    async fn generate_mcq(
        &self,
        request: GenerateMcqRequest,
    ) -> Result<GeneratedQuestionsResponse, QuizApiError>;

    async fn generate_challenge(
        &self,
        request: GenerateChallengeRequest,
    ) -> Result<ChallengeResponse, QuizApiError>;

    async fn evaluate_aptitude(
        &self,
        request: EvaluateAptitudeRequest,
    ) -> Result<EvaluationOutcome, QuizApiError>;

    async fn evaluate_code(
        &self,
        request: EvaluateCodeRequest,
    ) -> Result<EvaluationOutcome, QuizApiError>;
}

static QUOTA_MARKERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)quota|\b429\b").expect("quota marker pattern is valid"));
static MODEL_MARKERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)gemini|model\b|\bai\b").expect("model marker pattern is valid"));

/// Maps an upstream status code and response payload onto a structured
/// error kind. Quota markers win over everything else because the upstream
/// reports quota exhaustion with varying status codes.
pub fn classify_upstream(status: Option<u16>, payload: &str) -> QuizApiError {
    if status == Some(429) || QUOTA_MARKERS.is_match(payload) {
        return QuizApiError::QuotaExceeded;
    }
    if status == Some(422) {
        return QuizApiError::Validation(payload.trim().to_string());
    }
    if let Some(code) = status.filter(|code| *code >= 500) {
        return QuizApiError::Server(code);
    }
    if MODEL_MARKERS.is_match(payload) {
        return QuizApiError::ModelUnavailable;
    }
    QuizApiError::Unexpected(payload.trim().to_string())
}

fn transport_error(err: reqwest::Error) -> QuizApiError {
    if err.is_timeout() {
        QuizApiError::Timeout
    } else {
        QuizApiError::Network(err.to_string())
    }
}

pub struct HttpQuizApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpQuizApi {
    pub fn new(config: &Config) -> Result<Self, QuizApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()
            .map_err(|err| QuizApiError::Network(err.to_string()))?;

        Ok(Self {
            client,
            base_url: config.upstream_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, QuizApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let payload = response.text().await.map_err(transport_error)?;

        if !(200..300).contains(&status) {
            log::warn!("quiz API {} returned status {}", path, status);
            return Err(classify_upstream(Some(status), &payload));
        }

        serde_json::from_str(&payload)
            .map_err(|err| QuizApiError::Unexpected(format!("invalid JSON from {}: {}", path, err)))
    }
}

#[async_trait]
impl QuizApi for HttpQuizApi {
    async fn generate_aptitude(&self) -> Result<GeneratedQuestionsResponse, QuizApiError> {
        self.post_json("/generate/aptitude", &serde_json::json!({}))
            .await
    }

    async fn generate_mcq(
        &self,
        request: GenerateMcqRequest,
    ) -> Result<GeneratedQuestionsResponse, QuizApiError> {
        self.post_json("/generate/mcq", &request).await
    }

    async fn generate_challenge(
        &self,
        request: GenerateChallengeRequest,
    ) -> Result<ChallengeResponse, QuizApiError> {
        self.post_json("/generate/challenge", &request).await
    }

    async fn evaluate_aptitude(
        &self,
        request: EvaluateAptitudeRequest,
    ) -> Result<EvaluationOutcome, QuizApiError> {
        self.post_json("/evaluate/aptitude", &request).await
    }

    async fn evaluate_code(
        &self,
        request: EvaluateCodeRequest,
    ) -> Result<EvaluationOutcome, QuizApiError> {
        self.post_json("/evaluate/code", &request).await
    }
}
