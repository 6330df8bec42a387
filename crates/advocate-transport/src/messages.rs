// SPDX-License-Identifier: Apache-2.0

use advocate_types::WidgetSnapshot;

/// The action shape carried on `ExecuteAction`. A reduced wire view of
/// `AgentAction` — `RequestHumanReview` and `MarkResolved` never dispatch to
/// the surface, so they have no representation here.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchAction {
    TypeMessage { text: String },
    ClickButton { button_label: String },
    UploadFile { file_description: String },
    Wait { duration_ms: u64, reason: String },
}

/// `event.type` values carried on an `agent_event` transport message; fields
/// mirror what the per-iteration protocol emits at each step.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEventKind {
    Action { description: String },
    AgentMessage { text: String },
    SupportMessage { text: String },
    Waiting { reason: String },
    Paused {
        reason: String,
        needs_input: bool,
        input_prompt: Option<String>,
    },
    Completed { summary: String },
    Error { message: String },
}

/// Inbound messages the engine consumes. `Resume` carries optional free-text
/// user input gathered while the case was paused.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportInbound {
    Snapshot(WidgetSnapshot),
    ActionResult {
        action_id: String,
        success: bool,
        error: Option<String>,
    },
    Pause,
    Stop,
    Resume { user_input: Option<String> },
}
