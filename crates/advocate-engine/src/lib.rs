// SPDX-License-Identifier: Apache-2.0

//! Agent Loop Engine: turns a case into a live, event-driven observe-think-act
//! session. One [`SessionLoop`] task per case; the engine itself is just a
//! thin registry plus message routing into each session's channel.

mod error;
mod session;

pub use error::EngineError;
pub use session::SessionMessage;

use std::collections::HashMap;
use std::sync::Arc;

use advocate_config::EngineConfig;
use advocate_decider::LlmDecider;
use advocate_store::CaseStore;
use advocate_transport::SurfaceTransport;
use advocate_types::{CaseContext, CaseStatus, WidgetSnapshot};
use session::SessionLoop;
use tokio::sync::{mpsc, Mutex};
use tracing::warn;

const SESSION_CHANNEL_CAPACITY: usize = 64;

struct SessionHandle {
    tx: mpsc::Sender<SessionMessage>,
    task: tokio::task::JoinHandle<()>,
}

/// Owns every live session. The Case Store, Decider, and engine budgets are
/// constructor dependencies — no globals, so an instance is trivially testable
/// in isolation or run many-to-a-process.
pub struct AgentLoopEngine {
    store: Arc<CaseStore>,
    decider: Arc<dyn LlmDecider>,
    config: EngineConfig,
    sessions: Mutex<HashMap<String, SessionHandle>>,
}

impl AgentLoopEngine {
    pub fn new(store: Arc<CaseStore>, decider: Arc<dyn LlmDecider>, config: EngineConfig) -> Self {
        Self {
            store,
            decider,
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Create or replace the session for `case_id` and kick it off. Runs the
    /// case-level policy gate (§4.4) if the case is still `queued`; a case
    /// already past that point is picked up as-is so a second `start_session`
    /// call is a clean restart rather than a re-judged one.
    pub async fn start_session(
        &self,
        case_id: &str,
        transport: Arc<dyn SurfaceTransport>,
    ) -> Result<(), EngineError> {
        let current = self
            .store
            .get(case_id)
            .ok_or_else(|| EngineError::from(advocate_store::StoreError::CaseNotFound(case_id.to_string())))?;

        let case = if current.status == CaseStatus::Queued {
            self.store.start(case_id)?
        } else {
            current
        };

        self.stop_session(case_id).await;

        let mut context = CaseContext::new(case.id.clone(), case.customer_name.clone(), case.issue.clone());
        context.desired_outcome = case.desired_outcome.clone();
        context.order_id = case.order_id.clone();
        context.has_attachments = !case.attachment_paths.is_empty();

        let initially_paused = case.status == CaseStatus::PausedForApproval;

        let (tx, rx) = mpsc::channel(SESSION_CHANNEL_CAPACITY);
        let session = SessionLoop::new(
            case.id.clone(),
            context,
            initially_paused,
            self.store.clone(),
            self.decider.clone(),
            transport.clone(),
            self.config.clone(),
        );

        if !initially_paused {
            transport.request_snapshot(&case.id).await;
        }

        let task = tokio::spawn(session.run(rx));
        self.sessions
            .lock()
            .await
            .insert(case_id.to_string(), SessionHandle { tx, task });
        Ok(())
    }

    /// Forward routing: a snapshot arrived for `case_id`. No-op if no session
    /// is running for it.
    pub async fn ingest_snapshot(&self, case_id: &str, snapshot: WidgetSnapshot) {
        self.send(case_id, SessionMessage::Snapshot(snapshot)).await;
    }

    pub async fn ingest_action_result(
        &self,
        case_id: &str,
        action_id: String,
        success: bool,
        error: Option<String>,
    ) {
        self.send(
            case_id,
            SessionMessage::ActionResult {
                action_id,
                success,
                error,
            },
        )
        .await;
    }

    pub async fn pause_session(&self, case_id: &str) {
        self.send(case_id, SessionMessage::Pause).await;
    }

    pub async fn resume_session(&self, case_id: &str, user_input: Option<String>) {
        self.send(case_id, SessionMessage::Resume { user_input }).await;
    }

    /// Idempotent: cancels any pending rendezvous, drops the session from the
    /// registry, and lets its task wind down. A second call on an already
    /// absent session is a silent no-op.
    pub async fn stop_session(&self, case_id: &str) {
        let handle = self.sessions.lock().await.remove(case_id);
        if let Some(handle) = handle {
            let _ = handle.tx.send(SessionMessage::Stop).await;
            handle.task.abort();
        }
    }

    async fn send(&self, case_id: &str, message: SessionMessage) {
        let sessions = self.sessions.lock().await;
        if let Some(handle) = sessions.get(case_id) {
            if handle.tx.send(message).await.is_err() {
                warn!(case_id, "session task ended before message delivery");
            }
        }
    }
}
