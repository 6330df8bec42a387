// SPDX-License-Identifier: Apache-2.0

use advocate_types::{Category, Strategy};

/// First matching bucket wins: damaged → shipping → billing → account → unknown.
/// Keyword lists are intentionally small and literal rather than fuzzy — a
/// miss here just falls through to `unknown`, which routes to human review
/// further down the pipeline rather than silently mis-resolving.
const DAMAGED_KEYWORDS: &[&str] = &["damaged", "broken", "crushed", "shattered", "defective"];
const SHIPPING_KEYWORDS: &[&str] = &[
    "shipping",
    "delivery",
    "tracking",
    "never arrived",
    "lost package",
    "still hasn't shipped",
];
const BILLING_KEYWORDS: &[&str] = &[
    "billing",
    "charge",
    "charged",
    "invoice",
    "refund",
    "overcharged",
    "double charged",
];
const ACCOUNT_KEYWORDS: &[&str] = &[
    "account",
    "login",
    "log in",
    "password reset",
    "locked out",
    "can't sign in",
];

pub fn classify_category(issue: &str) -> Category {
    let lower = issue.to_lowercase();
    if DAMAGED_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Category::Damaged
    } else if SHIPPING_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Category::Shipping
    } else if BILLING_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Category::Billing
    } else if ACCOUNT_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Category::Account
    } else {
        Category::Unknown
    }
}

/// Category drives the initial strategy: product and billing problems route
/// to refund automation, account issues need a human because they usually
/// involve identity verification, and anything unclassified is parked for
/// closure rather than guessed at.
pub fn strategy_for_category(category: Category) -> Strategy {
    match category {
        Category::Damaged | Category::Shipping | Category::Billing => Strategy::Refund,
        Category::Account => Strategy::Human,
        Category::Unknown => Strategy::Close,
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
