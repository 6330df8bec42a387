// SPDX-License-Identifier: Apache-2.0

//! LLM Decider: renders the filtered snapshot and case context into a
//! prompt, advertises the fixed `AgentAction` tool set, and turns whatever
//! the model returns into a validated decision — never a crash.

mod client;
mod error;
mod mock;
mod parse;
mod prompt;
mod tool_schema;

pub use client::{AzureOpenAiDecider, LlmDecider};
pub use error::DeciderError;
pub use mock::{FailingDecider, ScriptedDecider};
pub use parse::{parse_tool_call, RawToolCall};
pub use prompt::{build_system_prompt, build_user_message};
pub use tool_schema::tool_definitions;
