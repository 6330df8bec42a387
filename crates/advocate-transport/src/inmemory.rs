// SPDX-License-Identifier: Apache-2.0

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::messages::{AgentEventKind, DispatchAction};
use crate::SurfaceTransport;

/// One outbound message the engine sent, recorded in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundRecord {
    RequestSnapshot { case_id: String },
    ExecuteAction {
        case_id: String,
        action_id: String,
        action: DispatchAction,
    },
    AgentEvent { case_id: String, event: AgentEventKind },
    CaseCompleted { case_id: String, summary: String },
    CaseError { case_id: String, message: String },
}

/// Test/demo transport: every outbound call is appended to a shared log
/// instead of reaching a real surface. Used by the engine's own test suite
/// and by the binary's scripted demo runner.
#[derive(Clone, Default)]
pub struct InMemoryTransport {
    log: Arc<Mutex<Vec<OutboundRecord>>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<OutboundRecord> {
        std::mem::take(&mut self.log.lock().expect("transport log poisoned"))
    }

    pub fn records(&self) -> Vec<OutboundRecord> {
        self.log.lock().expect("transport log poisoned").clone()
    }
}

#[async_trait]
impl SurfaceTransport for InMemoryTransport {
    async fn request_snapshot(&self, case_id: &str) {
        self.log
            .lock()
            .expect("transport log poisoned")
            .push(OutboundRecord::RequestSnapshot {
                case_id: case_id.to_string(),
            });
    }

    async fn execute_action(&self, case_id: &str, action_id: &str, action: DispatchAction) {
        self.log
            .lock()
            .expect("transport log poisoned")
            .push(OutboundRecord::ExecuteAction {
                case_id: case_id.to_string(),
                action_id: action_id.to_string(),
                action,
            });
    }

    async fn agent_event(&self, case_id: &str, event: AgentEventKind) {
        self.log
            .lock()
            .expect("transport log poisoned")
            .push(OutboundRecord::AgentEvent {
                case_id: case_id.to_string(),
                event,
            });
    }

    async fn case_completed(&self, case_id: &str, summary: &str) {
        self.log
            .lock()
            .expect("transport log poisoned")
            .push(OutboundRecord::CaseCompleted {
                case_id: case_id.to_string(),
                summary: summary.to_string(),
            });
    }

    async fn case_error(&self, case_id: &str, message: &str) {
        self.log
            .lock()
            .expect("transport log poisoned")
            .push(OutboundRecord::CaseError {
                case_id: case_id.to_string(),
                message: message.to_string(),
            });
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_outbound_calls_in_order() {
        let t = InMemoryTransport::new();
        t.request_snapshot("case-1").await;
        t.agent_event(
            "case-1",
            AgentEventKind::Waiting {
                reason: "thinking".into(),
            },
        )
        .await;
        let records = t.records();
        assert_eq!(records.len(), 2);
        assert!(matches!(records[0], OutboundRecord::RequestSnapshot { .. }));
        assert!(matches!(records[1], OutboundRecord::AgentEvent { .. }));
    }

    #[tokio::test]
    async fn drain_clears_the_log() {
        let t = InMemoryTransport::new();
        t.request_snapshot("case-1").await;
        assert_eq!(t.drain().len(), 1);
        assert!(t.records().is_empty());
    }
}
