// SPDX-License-Identifier: Apache-2.0

//! Case Store: owns every case's lifecycle state and its durable event
//! journal, and fires the Conversation Archive after every mutation.

mod classify;
mod error;
mod store;

pub use classify::{classify_category, strategy_for_category};
pub use error::StoreError;
pub use store::{CaseStore, NewCase};
