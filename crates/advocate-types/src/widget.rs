// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time view the external chat surface exposes to the core.
///
/// `provider` is an opaque identifier the surface chose for the chat widget
/// it detected (e.g. `"zendesk"`, `"intercom"`); the core never branches on
/// its value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WidgetSnapshot {
    pub provider: String,
    pub captured_at: DateTime<Utc>,
    pub messages: Vec<Message>,
    pub buttons: Vec<Button>,
    pub input_field: InputField,
    pub typing_indicator: bool,
    pub url: String,
}

impl WidgetSnapshot {
    /// Construct an empty snapshot for a given provider/url pair — useful as
    /// a starting point for surface adapters and tests.
    pub fn empty(provider: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            captured_at: Utc::now(),
            messages: Vec::new(),
            buttons: Vec::new(),
            input_field: InputField::default(),
            typing_indicator: false,
            url: url.into(),
        }
    }
}

/// Who produced a chat message, from the core's point of view.
///
/// `User` denotes messages the agent itself sent on the customer's behalf —
/// the widget has no concept of "the automation", only first-person chat
/// turns, so this is the voice the agent must also use when composing new
/// messages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Agent,
    System,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ButtonKind {
    QuickReply,
    Action,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Button {
    pub label: String,
    pub kind: ButtonKind,
    /// Opaque selector the surface uses to locate this element; the core
    /// never interprets it, only forwards it back on dispatch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InputField {
    pub found: bool,
    #[serde(default)]
    pub current_value: String,
    #[serde(default)]
    pub placeholder: String,
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_has_no_messages_or_buttons() {
        let s = WidgetSnapshot::empty("zendesk", "https://example.test/chat");
        assert!(s.messages.is_empty());
        assert!(s.buttons.is_empty());
        assert!(!s.input_field.found);
        assert!(!s.typing_indicator);
    }

    #[test]
    fn message_new_has_no_timestamp_by_default() {
        let m = Message::new(Sender::User, "hello");
        assert!(m.timestamp.is_none());
        assert_eq!(m.sender, Sender::User);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut s = WidgetSnapshot::empty("intercom", "https://example.test");
        s.messages.push(Message::new(Sender::Agent, "How can I help?"));
        s.buttons.push(Button {
            label: "Request Refund".into(),
            kind: ButtonKind::Action,
            selector: Some("#refund-btn".into()),
        });
        let json = serde_json::to_string(&s).unwrap();
        let back: WidgetSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
