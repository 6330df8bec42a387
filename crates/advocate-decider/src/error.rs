// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Errors the Decider can surface. `ContractViolation` is intentionally
/// swallowed by callers in the engine's per-iteration protocol — it never
/// reaches the surface as a propagated error, only as a safe `Wait` action —
/// but it is still a distinct variant so the decider's own tests and logs can
/// tell "the model misbehaved" apart from "the network misbehaved".
#[derive(Debug, Error)]
pub enum DeciderError {
    #[error("transient decider failure: {0}")]
    Transient(String),

    #[error("permanent decider failure: {0}")]
    PermanentInvalid(String),

    #[error("decider contract violation: {0}")]
    ContractViolation(String),
}
