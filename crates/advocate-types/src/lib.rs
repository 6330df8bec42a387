// SPDX-License-Identifier: Apache-2.0

//! Shared data model for the per-case agent loop: the widget snapshot the
//! surface hands in, the per-session context the Decider sees, the closed set
//! of actions the Decider may choose, and the case record owned by the
//! Case Store.

mod action;
mod case;
mod context;
mod widget;

pub use action::{AgentAction, AgentDecision};
pub use case::{
    Case, CaseEvent, CaseEventKind, CaseStatus, Category, ExecutionMode, NewCaseEvent, Strategy,
};
pub use context::CaseContext;
pub use widget::{Button, ButtonKind, InputField, Message, Sender, WidgetSnapshot};
