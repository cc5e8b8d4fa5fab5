use std::sync::Arc;
use std::time::Duration;

use crate::{
    clients::quiz_api::{HttpQuizApi, QuizApi},
    config::Config,
    errors::{AppError, AppResult},
    services::session_store::SessionStore,
};

#[derive(Clone)]
pub struct AppState {
    pub quiz_api: Arc<dyn QuizApi>,
    pub proxy_client: reqwest::Client,
    pub sessions: Arc<SessionStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> AppResult<Self> {
        let quiz_api = Arc::new(HttpQuizApi::new(&config)?);
        Self::with_api(config, quiz_api)
    }

    /// Assembles state around an arbitrary upstream client. Tests use this
    /// to swap in a scripted client.
    pub fn with_api(config: Config, quiz_api: Arc<dyn QuizApi>) -> AppResult<Self> {
        let proxy_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()
            .map_err(|err| AppError::InternalError(err.to_string()))?;

        Ok(Self {
            quiz_api,
            proxy_client,
            sessions: Arc::new(SessionStore::new()),
            config: Arc::new(config),
        })
    }
}
