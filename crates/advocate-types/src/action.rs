// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// The closed set of next steps the Decider may choose. This is the only
/// place a new capability can be added — everything downstream (policy,
/// dispatch, archive) matches exhaustively against this type, so an unknown
/// tool name from the model can never reach here as anything but a `Wait`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentAction {
    TypeMessage {
        text: String,
    },
    ClickButton {
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
    },
    UploadFile {
        description: String,
    },
    Wait {
        duration_ms: u64,
        reason: String,
    },
    RequestHumanReview {
        reason: String,
        #[serde(default)]
        needs_input: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        input_prompt: Option<String>,
    },
    MarkResolved {
        summary: String,
    },
}

impl AgentAction {
    /// Build the Decider's safe fallback action for malformed or missing
    /// tool-call output. Never fails, never panics — this is the contract
    /// that lets the Engine treat a bad model response as a normal `Wait`.
    pub fn fallback_wait(reason: impl Into<String>) -> Self {
        AgentAction::Wait {
            duration_ms: 3_000,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentDecision {
    pub action: AgentAction,
    pub reasoning: String,
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_wait_uses_three_second_default() {
        let a = AgentAction::fallback_wait("no tool call returned");
        match a {
            AgentAction::Wait { duration_ms, reason } => {
                assert_eq!(duration_ms, 3_000);
                assert_eq!(reason, "no tool call returned");
            }
            _ => panic!("expected Wait"),
        }
    }

    #[test]
    fn action_round_trips_through_json_tagged_union() {
        let a = AgentAction::ClickButton {
            label: "Request Refund".into(),
            selector: Some("#refund".into()),
        };
        let json = serde_json::to_string(&a).unwrap();
        assert!(json.contains("\"type\":\"click_button\""));
        let back: AgentAction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn mark_resolved_round_trips() {
        let a = AgentAction::MarkResolved {
            summary: "Refund approved".into(),
        };
        let json = serde_json::to_string(&a).unwrap();
        let back: AgentAction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }
}
