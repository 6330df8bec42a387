// SPDX-License-Identifier: Apache-2.0

use advocate_store::StoreError;
use thiserror::Error;

/// Errors the engine itself raises, plus the Case Store errors that can
/// surface through `start_session` before any session exists to swallow them.
///
/// A control or result message addressed to an id with no live session is a
/// silent no-op at every routing method (`ingest_snapshot`, `pause_session`,
/// ...) rather than an error variant here; only a missing *case* at
/// `start_session` is a hard failure, and that's the Case Store's own
/// `CaseNotFound`, forwarded through `Store` below.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),
}
