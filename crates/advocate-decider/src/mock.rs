// SPDX-License-Identifier: Apache-2.0

use std::sync::{Arc, Mutex};

use advocate_types::{AgentAction, AgentDecision, CaseContext, WidgetSnapshot};
use async_trait::async_trait;

use crate::client::LlmDecider;
use crate::error::DeciderError;

/// Pre-scripted decider for tests and the demo binary. Each call to
/// `decide` pops the next action off the front of the queue; once the
/// queue is drained it returns the configured default forever.
pub struct ScriptedDecider {
    queue: Mutex<Vec<AgentAction>>,
    default_action: AgentAction,
}

impl ScriptedDecider {
    pub fn new(actions: Vec<AgentAction>) -> Self {
        Self {
            queue: Mutex::new(actions),
            default_action: AgentAction::fallback_wait("scripted decider queue exhausted"),
        }
    }

    pub fn single(action: AgentAction) -> Self {
        Self::new(vec![action])
    }
}

#[async_trait]
impl LlmDecider for ScriptedDecider {
    async fn decide(
        &self,
        _filtered_snapshot: &WidgetSnapshot,
        _context: &CaseContext,
    ) -> Result<AgentDecision, DeciderError> {
        let mut queue = self.queue.lock().expect("scripted decider lock poisoned");
        let action = if queue.is_empty() {
            self.default_action.clone()
        } else {
            queue.remove(0)
        };
        Ok(AgentDecision {
            action,
            reasoning: "scripted".to_string(),
        })
    }
}

/// Always fails with the given error — for exercising the engine's transient
/// error handling without a real backend.
pub struct FailingDecider {
    pub error: Arc<dyn Fn() -> DeciderError + Send + Sync>,
}

impl FailingDecider {
    pub fn transient(message: impl Into<String> + Send + Sync + Clone + 'static) -> Self {
        Self {
            error: Arc::new(move || DeciderError::Transient(message.clone().into())),
        }
    }
}

#[async_trait]
impl LlmDecider for FailingDecider {
    async fn decide(
        &self,
        _filtered_snapshot: &WidgetSnapshot,
        _context: &CaseContext,
    ) -> Result<AgentDecision, DeciderError> {
        Err((self.error)())
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use advocate_types::WidgetSnapshot;

    #[tokio::test]
    async fn scripted_decider_pops_in_order() {
        let decider = ScriptedDecider::new(vec![
            AgentAction::TypeMessage { text: "hi".into() },
            AgentAction::MarkResolved {
                summary: "done".into(),
            },
        ]);
        let snapshot = WidgetSnapshot::empty("zendesk", "https://example.test");
        let ctx = CaseContext::new("c1", "Asha", "issue");

        let first = decider.decide(&snapshot, &ctx).await.unwrap();
        assert_eq!(first.action, AgentAction::TypeMessage { text: "hi".into() });

        let second = decider.decide(&snapshot, &ctx).await.unwrap();
        assert_eq!(
            second.action,
            AgentAction::MarkResolved {
                summary: "done".into()
            }
        );
    }

    #[tokio::test]
    async fn scripted_decider_falls_back_once_exhausted() {
        let decider = ScriptedDecider::single(AgentAction::MarkResolved {
            summary: "done".into(),
        });
        let snapshot = WidgetSnapshot::empty("zendesk", "https://example.test");
        let ctx = CaseContext::new("c1", "Asha", "issue");
        let _ = decider.decide(&snapshot, &ctx).await.unwrap();
        let second = decider.decide(&snapshot, &ctx).await.unwrap();
        assert!(matches!(second.action, AgentAction::Wait { .. }));
    }

    #[tokio::test]
    async fn failing_decider_returns_transient_error() {
        let decider = FailingDecider::transient("network down");
        let snapshot = WidgetSnapshot::empty("zendesk", "https://example.test");
        let ctx = CaseContext::new("c1", "Asha", "issue");
        let result = decider.decide(&snapshot, &ctx).await;
        assert!(matches!(result, Err(DeciderError::Transient(_))));
    }
}
