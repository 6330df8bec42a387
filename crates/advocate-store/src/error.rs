// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("case not found: {0}")]
    CaseNotFound(String),

    #[error("invalid transition for case {case_id}: {from} -> {to}")]
    InvalidTransition {
        case_id: String,
        from: String,
        to: String,
    },
}
