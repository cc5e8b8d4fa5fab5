use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, info};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::domain::question::AssessmentKind;
use crate::services::assessment_flow::{AssessmentFlow, TickOutcome};
use crate::services::evaluation::EvaluationTracker;

/// One live assessment session. The flow and the evaluation tracker are
/// locked independently so a slow evaluation never blocks the countdown.
#[derive(Debug)]
pub struct AssessmentSession {
    pub id: Uuid,
    pub flow: RwLock<AssessmentFlow>,
    pub tracker: Mutex<EvaluationTracker>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl AssessmentSession {
    fn new(id: Uuid, kind: AssessmentKind, time_limit_secs: u32) -> Self {
        Self {
            id,
            flow: RwLock::new(AssessmentFlow::new(kind, time_limit_secs)),
            tracker: Mutex::new(EvaluationTracker::default()),
            timer: Mutex::new(None),
        }
    }

    /// Starts the one-second countdown task for this session, replacing any
    /// previous one. The task stops on its own once a tick reports the flow
    /// left `ready`.
    pub async fn arm_timer(self: Arc<Self>) {
        let session = Arc::clone(&self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            // The first interval tick fires immediately; skip it so the
            // countdown starts a full second after arming.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let outcome = session.flow.write().await.tick();
                match outcome {
                    TickOutcome::Running => {}
                    TickOutcome::Expired => {
                        info!("session {} expired; auto-completed locally", session.id);
                        break;
                    }
                    TickOutcome::Idle => break,
                }
            }
        });

        if let Some(previous) = self.timer.lock().await.replace(handle) {
            previous.abort();
        }
    }

    pub async fn cancel_timer(&self) {
        if let Some(handle) = self.timer.lock().await.take() {
            handle.abort();
        }
    }
}

/// In-memory registry of assessment sessions, keyed by id.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Arc<AssessmentSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session in `loading` and returns it. The caller arms
    /// the timer once questions arrive.
    pub async fn create(
        &self,
        kind: AssessmentKind,
        time_limit_secs: u32,
    ) -> Arc<AssessmentSession> {
        let id = Uuid::new_v4();
        let session = Arc::new(AssessmentSession::new(id, kind, time_limit_secs));
        self.sessions.write().await.insert(id, Arc::clone(&session));
        debug!("created {} assessment session {}", kind, id);
        session
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Arc<AssessmentSession>> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Assessment session {} not found", id)))
    }

    /// Removes a session and stops its countdown.
    pub async fn remove(&self, id: Uuid) -> AppResult<()> {
        let session = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("Assessment session {} not found", id)))?;
        session.cancel_timer().await;
        debug!("removed assessment session {}", id);
        Ok(())
    }

    /// Drops every session older than `ttl`, measured from the last
    /// (re)load of its questions. Sessions are memory-only, so abandoned
    /// flows must be reaped rather than waiting for an explicit delete.
    pub async fn sweep_expired(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;

        let mut expired = Vec::new();
        for (id, session) in sessions.iter() {
            let started_at = session.flow.read().await.started_at();
            if (Utc::now() - started_at).num_seconds() >= ttl.as_secs() as i64 {
                expired.push(*id);
            }
        }

        for id in &expired {
            if let Some(session) = sessions.remove(id) {
                session.cancel_timer().await;
            }
        }

        if !expired.is_empty() {
            info!("swept {} idle assessment sessions", expired.len());
        }
        expired.len()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
