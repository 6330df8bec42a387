// SPDX-License-Identifier: Apache-2.0

use std::fmt::Write as _;

use advocate_types::{CaseContext, Sender, WidgetSnapshot};

const RECENT_ACTIONS_WINDOW: usize = 8;

/// System prompt: the agent's role, safety rules, and the static case facts.
/// Rebuilt fresh every iteration from `context` rather than cached, since
/// `desired_outcome` and the other fields can change between iterations.
pub fn build_system_prompt(context: &CaseContext) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "You are the customer's advocate in a support chat. Always write in the \
         first person, as if you are the customer speaking for themselves."
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Safety rules:");
    let _ = writeln!(out, "- Never reveal that you are an automated agent.");
    let _ = writeln!(
        out,
        "- Never share sensitive personal information (SSNs, card numbers, passwords)."
    );
    let _ = writeln!(
        out,
        "- When you are unsure how to proceed, defer to a human by requesting review."
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Case facts:");
    let _ = writeln!(out, "- Issue: {}", context.issue);
    if let Some(outcome) = &context.desired_outcome {
        let _ = writeln!(out, "- Desired outcome: {outcome}");
    }
    if let Some(order_id) = &context.order_id {
        let _ = writeln!(out, "- Order id: {order_id}");
    }
    let _ = writeln!(
        out,
        "- Attachments provided: {}",
        if context.has_attachments { "yes" } else { "no" }
    );
    out
}

/// User message: a rendered view of the current (already filtered) snapshot
/// plus the trailing window of what the engine has done so far.
pub fn build_user_message(snapshot: &WidgetSnapshot, context: &CaseContext) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Provider: {}", snapshot.provider);
    let _ = writeln!(out, "URL: {}", snapshot.url);
    let _ = writeln!(out);
    let _ = writeln!(out, "Conversation so far:");
    if snapshot.messages.is_empty() {
        let _ = writeln!(out, "(no messages yet)");
    } else {
        for message in &snapshot.messages {
            let label = match message.sender {
                Sender::User => "You (customer)",
                Sender::Agent => "Support",
                Sender::System => "System",
                Sender::Unknown => "Unknown",
            };
            let _ = writeln!(out, "{label}: {}", message.text);
        }
    }
    let _ = writeln!(out);
    if snapshot.buttons.is_empty() {
        let _ = writeln!(out, "Buttons: (none)");
    } else {
        let _ = writeln!(out, "Buttons:");
        for (i, button) in snapshot.buttons.iter().enumerate() {
            let _ = writeln!(out, "  {}. \"{}\" ({:?})", i + 1, button.label, button.kind);
        }
    }
    let _ = writeln!(
        out,
        "Input field: found={} value={:?} placeholder={:?}",
        snapshot.input_field.found,
        snapshot.input_field.current_value,
        snapshot.input_field.placeholder
    );
    if snapshot.typing_indicator {
        let _ = writeln!(out, "Support is typing...");
    }
    let _ = writeln!(out);
    let recent = context.recent_actions(RECENT_ACTIONS_WINDOW);
    if recent.is_empty() {
        let _ = writeln!(out, "Previous actions: (none yet)");
    } else {
        let _ = writeln!(out, "Previous actions:");
        for action in recent {
            let _ = writeln!(out, "  - {action}");
        }
    }
    out
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
