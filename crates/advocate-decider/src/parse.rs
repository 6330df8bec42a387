// SPDX-License-Identifier: Apache-2.0

use advocate_types::AgentAction;
use serde_json::Value;

/// A single tool invocation as reported by the model, before it has been
/// validated against the closed `AgentAction` set.
#[derive(Debug, Clone)]
pub struct RawToolCall {
    pub name: String,
    pub arguments: Value,
}

/// Turn a model's tool call into an `AgentAction`, falling back to a safe
/// `Wait` on anything this function cannot make sense of: no call at all, an
/// unrecognized name, or arguments missing a required field. This function
/// never fails — that is the whole point of the contract.
pub fn parse_tool_call(call: Option<RawToolCall>, reasoning: &str) -> AgentAction {
    let Some(call) = call else {
        return AgentAction::fallback_wait(if reasoning.is_empty() {
            "model returned no tool call".to_string()
        } else {
            reasoning.to_string()
        });
    };

    let args = &call.arguments;
    match call.name.as_str() {
        "type_message" => match args.get("text").and_then(Value::as_str) {
            Some(text) => AgentAction::TypeMessage {
                text: text.to_string(),
            },
            None => AgentAction::fallback_wait("type_message call missing \"text\""),
        },
        "click_button" => match args.get("buttonLabel").and_then(Value::as_str) {
            Some(label) => AgentAction::ClickButton {
                label: label.to_string(),
                selector: None,
            },
            None => AgentAction::fallback_wait("click_button call missing \"buttonLabel\""),
        },
        "upload_file" => match args.get("fileDescription").and_then(Value::as_str) {
            Some(description) => AgentAction::UploadFile {
                description: description.to_string(),
            },
            None => AgentAction::fallback_wait("upload_file call missing \"fileDescription\""),
        },
        "wait_for_response" => {
            let duration_ms = args.get("durationMs").and_then(Value::as_u64);
            let reason = args.get("reason").and_then(Value::as_str);
            match (duration_ms, reason) {
                (Some(duration_ms), Some(reason)) => AgentAction::Wait {
                    duration_ms,
                    reason: reason.to_string(),
                },
                _ => AgentAction::fallback_wait("wait_for_response call missing fields"),
            }
        }
        "request_human_review" => match args.get("reason").and_then(Value::as_str) {
            Some(reason) => AgentAction::RequestHumanReview {
                reason: reason.to_string(),
                needs_input: args
                    .get("needsInput")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                input_prompt: args
                    .get("inputPrompt")
                    .and_then(Value::as_str)
                    .map(|s| s.to_string()),
            },
            None => AgentAction::fallback_wait("request_human_review call missing \"reason\""),
        },
        "mark_resolved" => match args.get("summary").and_then(Value::as_str) {
            Some(summary) => AgentAction::MarkResolved {
                summary: summary.to_string(),
            },
            None => AgentAction::fallback_wait("mark_resolved call missing \"summary\""),
        },
        unknown => AgentAction::fallback_wait(format!("unknown tool name \"{unknown}\"")),
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
