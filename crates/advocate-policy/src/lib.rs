// SPDX-License-Identifier: Apache-2.0

//! Two-tier safety gate the engine consults before dispatching any action the
//! Decider proposes. Pure and stateless: same action in, same verdict out.

use advocate_types::AgentAction;

const BLOCKED_TERMS: &[&str] = &[
    "social security",
    "credit card number",
    "full card",
    "bank account",
    "routing number",
    "password",
    "pin number",
];

const COMMITMENT_TERMS: &[&str] = &[
    "cancel my account",
    "delete my account",
    "accept the offer",
    "agree to",
    "authorize",
    "sign up",
    "subscribe",
    "payment",
    "pay now",
];

const RISKY_LABEL_FRAGMENTS: &[&str] =
    &["pay", "purchase", "buy", "subscribe", "delete", "confirm order"];

/// High-risk issue language that forces a case to pause before its first
/// iteration, regardless of what the Decider would have proposed.
const HIGH_RISK_ISSUE_TERMS: &[&str] = &["fraud", "chargeback", "legal", "lawsuit", "police"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyResult {
    Allowed,
    NeedsApproval { reason: String },
    Blocked { reason: String },
}

impl PolicyResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, PolicyResult::Allowed)
    }
}

/// Evaluate a single proposed action against the ordered rule list. Rules are
/// checked in order and the first match wins — a `TypeMessage` containing
/// both a blocked and a commitment term is `Blocked`, never `NeedsApproval`.
pub fn evaluate(action: &AgentAction) -> PolicyResult {
    match action {
        AgentAction::TypeMessage { text } => {
            let lower = text.to_lowercase();
            if let Some(term) = BLOCKED_TERMS.iter().find(|t| lower.contains(*t)) {
                return PolicyResult::Blocked {
                    reason: format!("message contains blocked term \"{term}\""),
                };
            }
            if let Some(term) = COMMITMENT_TERMS.iter().find(|t| lower.contains(*t)) {
                return PolicyResult::NeedsApproval {
                    reason: format!("message contains commitment term \"{term}\""),
                };
            }
            PolicyResult::Allowed
        }
        AgentAction::ClickButton { label, .. } => {
            let lower = label.to_lowercase();
            if let Some(term) = RISKY_LABEL_FRAGMENTS.iter().find(|t| lower.contains(*t)) {
                return PolicyResult::NeedsApproval {
                    reason: format!("button label contains risky fragment \"{term}\""),
                };
            }
            PolicyResult::Allowed
        }
        _ => PolicyResult::Allowed,
    }
}

/// Case-level gate run once at creation: does the stated issue itself carry
/// high-risk language that should force human review before any automation
/// runs? Independent of `evaluate`, which only looks at proposed actions.
pub fn requires_case_level_hold(issue: &str) -> Option<String> {
    let lower = issue.to_lowercase();
    HIGH_RISK_ISSUE_TERMS
        .iter()
        .find(|t| lower.contains(*t))
        .map(|term| format!("issue description mentions high-risk term \"{term}\""))
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
