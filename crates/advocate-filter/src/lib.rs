// SPDX-License-Identifier: Apache-2.0

//! Deterministic PII redaction applied to a [`WidgetSnapshot`] before it is
//! ever rendered into an LLM prompt. No network calls, no state: the same
//! snapshot always filters to the same output.

use advocate_types::WidgetSnapshot;
use regex::Regex;

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

/// Holds the compiled rule set so patterns are built once, not per call.
pub struct SensitiveFilter {
    rules: Vec<Rule>,
}

impl SensitiveFilter {
    pub fn new() -> Self {
        let rules = vec![
            Rule {
                pattern: Regex::new(r"\b\d{3}[-.\s]?\d{2}[-.\s]?\d{4}\b").unwrap(),
                replacement: "[SSN REDACTED]",
            },
            Rule {
                pattern: Regex::new(r"\b\d{4}[-.\s]\d{4}[-.\s]\d{4}[-.\s]\d{4}\b").unwrap(),
                replacement: "[CARD REDACTED]",
            },
            Rule {
                pattern: Regex::new(r"(?i)\bcvv:?\s*\d{3,4}\b").unwrap(),
                replacement: "[CVV REDACTED]",
            },
            Rule {
                pattern: Regex::new(r"(?i)\b(password|passwd|pwd)\s*[:=]\s*\S+").unwrap(),
                replacement: "[PASSWORD REDACTED]",
            },
            Rule {
                pattern: Regex::new(
                    r"(?:\+?1[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b",
                )
                .unwrap(),
                replacement: "[PHONE ***]",
            },
            Rule {
                pattern: Regex::new(r"[[:word:].+-]+@[[:word:].-]+\.[A-Za-z]{2,}").unwrap(),
                replacement: "[EMAIL ***]",
            },
        ];
        Self { rules }
    }

    fn redact(&self, text: &str) -> String {
        let mut out = text.to_string();
        for rule in &self.rules {
            out = rule.pattern.replace_all(&out, rule.replacement).into_owned();
        }
        out
    }

    /// Run every rule, in order, over every text-bearing field of a snapshot.
    /// Idempotent: filtering an already-filtered snapshot changes nothing,
    /// since none of the replacement tokens match any rule's pattern.
    pub fn filter(&self, mut snapshot: WidgetSnapshot) -> WidgetSnapshot {
        for message in &mut snapshot.messages {
            message.text = self.redact(&message.text);
        }
        for button in &mut snapshot.buttons {
            button.label = self.redact(&button.label);
        }
        snapshot.input_field.current_value = self.redact(&snapshot.input_field.current_value);
        snapshot
    }
}

impl Default for SensitiveFilter {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use advocate_types::{Button, ButtonKind, InputField, Message, Sender};

    fn snapshot_with_message(text: &str) -> WidgetSnapshot {
        let mut s = WidgetSnapshot::empty("zendesk", "https://example.test");
        s.messages.push(Message::new(Sender::User, text));
        s
    }

    #[test]
    fn redacts_ssn() {
        let f = SensitiveFilter::new();
        let out = f.filter(snapshot_with_message("my ssn is 123-45-6789 ok"));
        assert_eq!(out.messages[0].text, "my ssn is [SSN REDACTED] ok");
    }

    #[test]
    fn redacts_card_number() {
        let f = SensitiveFilter::new();
        let out = f.filter(snapshot_with_message("card 4111-1111-1111-1111 please"));
        assert_eq!(out.messages[0].text, "card [CARD REDACTED] please");
    }

    #[test]
    fn redacts_cvv_case_insensitive() {
        let f = SensitiveFilter::new();
        let out = f.filter(snapshot_with_message("CVV: 123"));
        assert_eq!(out.messages[0].text, "[CVV REDACTED]");
    }

    #[test]
    fn redacts_password_assignment() {
        let f = SensitiveFilter::new();
        let out = f.filter(snapshot_with_message("password=hunter2"));
        assert_eq!(out.messages[0].text, "[PASSWORD REDACTED]");
    }

    #[test]
    fn redacts_phone_number() {
        let f = SensitiveFilter::new();
        let out = f.filter(snapshot_with_message("call me at +1 (555) 123-4567"));
        assert_eq!(out.messages[0].text, "call me at [PHONE ***]");
    }

    #[test]
    fn redacts_email() {
        let f = SensitiveFilter::new();
        let out = f.filter(snapshot_with_message("reach me at jane.doe@example.com"));
        assert_eq!(out.messages[0].text, "reach me at [EMAIL ***]");
    }

    #[test]
    fn leaves_non_sensitive_text_verbatim() {
        let f = SensitiveFilter::new();
        let out = f.filter(snapshot_with_message("my package never arrived"));
        assert_eq!(out.messages[0].text, "my package never arrived");
    }

    #[test]
    fn filtering_is_idempotent() {
        let f = SensitiveFilter::new();
        let once = f.filter(snapshot_with_message("ssn 123-45-6789, email a@b.com"));
        let twice = f.filter(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn filters_button_labels_and_input_field() {
        let f = SensitiveFilter::new();
        let mut s = WidgetSnapshot::empty("zendesk", "https://example.test");
        s.buttons.push(Button {
            label: "Email a@b.com".into(),
            kind: ButtonKind::Action,
            selector: None,
        });
        s.input_field = InputField {
            found: true,
            current_value: "my number is 555-123-4567".into(),
            placeholder: "Type a message".into(),
        };
        let out = f.filter(s);
        assert_eq!(out.buttons[0].label, "Email [EMAIL ***]");
        assert_eq!(out.input_field.current_value, "my number is [PHONE ***]");
        assert_eq!(out.input_field.placeholder, "Type a message");
    }
}
