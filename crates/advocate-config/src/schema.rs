// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Where the Conversation Archive writes per-case snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Directory under which `<case_id>/case.json` and `<case_id>/timeline.md`
    /// are written. Created on demand; never read back from.
    #[serde(default = "default_archive_root")]
    pub root: PathBuf,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            root: default_archive_root(),
        }
    }
}

fn default_archive_root() -> PathBuf {
    PathBuf::from("./data/cases")
}

/// Connection details for the LLM backend the Decider talks to.
///
/// These are passed opaquely to the Decider — the core never inspects or
/// validates them beyond presence. `api_key` is never logged or archived.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub deployment: Option<String>,
    pub api_version: Option<String>,
}

/// Per-iteration budgets for the Agent Loop Engine.
///
/// The design treats these as fixed core constants; they are exposed here as
/// overridable configuration so a concrete deployment can tune them (e.g. a
/// shorter `snapshot_timeout_ms` in CI fixtures) without a core code change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "default_min_action_interval_ms")]
    pub min_action_interval_ms: u64,
    #[serde(default = "default_wait_after_message_ms")]
    pub wait_after_message_ms: u64,
    #[serde(default = "default_wait_after_click_or_upload_ms")]
    pub wait_after_click_or_upload_ms: u64,
    #[serde(default = "default_snapshot_timeout_ms")]
    pub snapshot_timeout_ms: u64,
}

fn default_max_iterations() -> u32 {
    30
}
fn default_min_action_interval_ms() -> u64 {
    2_000
}
fn default_wait_after_message_ms() -> u64 {
    45_000
}
fn default_wait_after_click_or_upload_ms() -> u64 {
    5_000
}
fn default_snapshot_timeout_ms() -> u64 {
    30_000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            min_action_interval_ms: default_min_action_interval_ms(),
            wait_after_message_ms: default_wait_after_message_ms(),
            wait_after_click_or_upload_ms: default_wait_after_click_or_upload_ms(),
            snapshot_timeout_ms: default_snapshot_timeout_ms(),
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
