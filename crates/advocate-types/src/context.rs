// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// Per-session accumulator the Decider sees. Owned and mutated only by the
/// Agent Loop Engine; `previous_actions` is append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseContext {
    pub case_id: String,
    pub customer_name: String,
    pub issue: String,
    pub desired_outcome: Option<String>,
    pub order_id: Option<String>,
    pub has_attachments: bool,
    previous_actions: Vec<String>,
}

impl CaseContext {
    pub fn new(
        case_id: impl Into<String>,
        customer_name: impl Into<String>,
        issue: impl Into<String>,
    ) -> Self {
        Self {
            case_id: case_id.into(),
            customer_name: customer_name.into(),
            issue: issue.into(),
            desired_outcome: None,
            order_id: None,
            has_attachments: false,
            previous_actions: Vec::new(),
        }
    }

    /// Append one human-readable entry describing what the engine just did.
    /// This is the only way `previous_actions` grows.
    pub fn record_action(&mut self, entry: impl Into<String>) {
        self.previous_actions.push(entry.into());
    }

    pub fn previous_actions(&self) -> &[String] {
        &self.previous_actions
    }

    /// The trailing window shown to the LLM — the last `n` entries, oldest
    /// first within the window. Older entries are elided to control prompt
    /// token cost.
    pub fn recent_actions(&self, n: usize) -> &[String] {
        let len = self.previous_actions.len();
        &self.previous_actions[len.saturating_sub(n)..]
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
