// SPDX-License-Identifier: Apache-2.0

use serde_json::{json, Value};

/// The fixed tool set advertised to the model, one entry per `AgentAction`
/// variant. Names match `parse_tool_call`'s expectations exactly so a
/// provider's function-calling layer can dispatch on them directly.
pub fn tool_definitions() -> Vec<Value> {
    vec![
        json!({
            "name": "type_message",
            "description": "Send a chat message to support, in the customer's own voice.",
            "parameters": {
                "type": "object",
                "properties": { "text": { "type": "string" } },
                "required": ["text"]
            }
        }),
        json!({
            "name": "click_button",
            "description": "Click a button shown in the widget by its visible label.",
            "parameters": {
                "type": "object",
                "properties": { "buttonLabel": { "type": "string" } },
                "required": ["buttonLabel"]
            }
        }),
        json!({
            "name": "upload_file",
            "description": "Upload a file attachment already associated with the case.",
            "parameters": {
                "type": "object",
                "properties": { "fileDescription": { "type": "string" } },
                "required": ["fileDescription"]
            }
        }),
        json!({
            "name": "wait_for_response",
            "description": "Wait for the support side to respond before doing anything else.",
            "parameters": {
                "type": "object",
                "properties": {
                    "durationMs": { "type": "integer" },
                    "reason": { "type": "string" }
                },
                "required": ["durationMs", "reason"]
            }
        }),
        json!({
            "name": "request_human_review",
            "description": "Pause automation and hand the case to a human.",
            "parameters": {
                "type": "object",
                "properties": {
                    "reason": { "type": "string" },
                    "needsInput": { "type": "boolean" },
                    "inputPrompt": { "type": "string" }
                },
                "required": ["reason"]
            }
        }),
        json!({
            "name": "mark_resolved",
            "description": "Mark the case resolved with a short summary.",
            "parameters": {
                "type": "object",
                "properties": { "summary": { "type": "string" } },
                "required": ["summary"]
            }
        }),
    ]
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
