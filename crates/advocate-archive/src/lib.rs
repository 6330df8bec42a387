// SPDX-License-Identifier: Apache-2.0

//! Conversation Archive: a pure sink the Case Store calls after every
//! mutation. Writes are last-writer-wins overwrites of two files per case —
//! never appends, never reads back from disk. Callers are expected to treat
//! every error here as best-effort: log it and move on.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use advocate_types::Case;
use anyhow::Context;

#[derive(Debug, Clone)]
pub struct ConversationArchive {
    root: PathBuf,
}

impl ConversationArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn case_dir(&self, case_id: &str) -> PathBuf {
        self.root.join(case_id)
    }

    /// Write `case.json` and `timeline.md` for the given case, creating the
    /// case's directory if needed. Overwrites whatever was there.
    pub fn write(&self, case: &Case) -> anyhow::Result<()> {
        let dir = self.case_dir(&case.id);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating archive directory {}", dir.display()))?;

        self.write_case_json(&dir, case)?;
        self.write_timeline(&dir, case)?;
        Ok(())
    }

    fn write_case_json(&self, dir: &Path, case: &Case) -> anyhow::Result<()> {
        let path = dir.join("case.json");
        let pretty = serde_json::to_string_pretty(case).context("serializing case snapshot")?;
        std::fs::write(&path, pretty)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    fn write_timeline(&self, dir: &Path, case: &Case) -> anyhow::Result<()> {
        let path = dir.join("timeline.md");
        let mut out = String::new();
        let _ = writeln!(out, "# Case {}", case.id);
        let _ = writeln!(out);
        let _ = writeln!(out, "- customer: {}", case.customer_name);
        let _ = writeln!(out, "- category: {}", case.category);
        let _ = writeln!(out, "- strategy: {}", case.strategy);
        let _ = writeln!(out, "- status: {}", case.status);
        let _ = writeln!(out);
        let _ = writeln!(out, "## Issue");
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", case.issue);
        let _ = writeln!(out);
        let _ = writeln!(out, "## Timeline");
        let _ = writeln!(out);
        for event in &case.events {
            let _ = writeln!(
                out,
                "- `{}` **{:?}**: {}",
                event.at.to_rfc3339(),
                event.kind,
                event.message,
            );
            if let Some(meta) = &event.meta {
                if !meta.is_empty() {
                    let _ = writeln!(
                        out,
                        "    {}",
                        serde_json::Value::Object(meta.clone())
                    );
                }
            }
        }
        std::fs::write(&path, out).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

/// Call `archive.write(case)` and swallow any error, logging it instead. This
/// is the shape every Case Store mutation should use so a broken disk never
/// blocks state progress.
pub fn archive_best_effort(archive: &ConversationArchive, case: &Case) {
    if let Err(err) = archive.write(case) {
        tracing::warn!(case_id = %case.id, error = %err, "archive write failed, continuing");
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use advocate_types::{CaseEvent, CaseEventKind, CaseStatus, Category, ExecutionMode, Strategy};
    use chrono::Utc;

    fn sample_case() -> Case {
        let now = Utc::now();
        Case {
            id: "case-1".into(),
            customer_name: "Asha Patel".into(),
            issue: "Package arrived damaged".into(),
            order_id: Some("ORD-9".into()),
            attachment_paths: vec![],
            category: Category::Damaged,
            strategy: Strategy::Refund,
            status: CaseStatus::Queued,
            execution_mode: ExecutionMode::Autonomous,
            desired_outcome: Some("refund".into()),
            created_at: now,
            updated_at: now,
            events: vec![CaseEvent {
                at: now,
                kind: CaseEventKind::CaseCreated,
                message: "case created".into(),
                meta: None,
            }],
            resolution_summary: None,
            last_error: None,
        }
    }

    #[test]
    fn writes_case_json_and_timeline() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = ConversationArchive::new(tmp.path());
        let case = sample_case();
        archive.write(&case).unwrap();

        let dir = tmp.path().join("case-1");
        assert!(dir.join("case.json").exists());
        assert!(dir.join("timeline.md").exists());

        let json = std::fs::read_to_string(dir.join("case.json")).unwrap();
        let round_tripped: Case = serde_json::from_str(&json).unwrap();
        assert_eq!(round_tripped, case);
    }

    #[test]
    fn timeline_includes_customer_and_events() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = ConversationArchive::new(tmp.path());
        let case = sample_case();
        archive.write(&case).unwrap();

        let timeline =
            std::fs::read_to_string(tmp.path().join("case-1").join("timeline.md")).unwrap();
        assert!(timeline.contains("Asha Patel"));
        assert!(timeline.contains("case created"));
    }

    #[test]
    fn second_write_overwrites_rather_than_appends() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = ConversationArchive::new(tmp.path());
        let mut case = sample_case();
        archive.write(&case).unwrap();

        case.status = CaseStatus::Running;
        archive.write(&case).unwrap();

        let json = std::fs::read_to_string(tmp.path().join("case-1").join("case.json")).unwrap();
        let round_tripped: Case = serde_json::from_str(&json).unwrap();
        assert_eq!(round_tripped.status, CaseStatus::Running);
        // Only ever one JSON document, not two concatenated.
        assert_eq!(json.matches("\"id\"").count(), 1);
    }

    #[test]
    fn best_effort_swallows_errors_on_unwritable_root() {
        // Root points at a path nested under a file, so create_dir_all fails.
        let tmp = tempfile::tempdir().unwrap();
        let blocking_file = tmp.path().join("not_a_dir");
        std::fs::write(&blocking_file, "x").unwrap();
        let archive = ConversationArchive::new(blocking_file.join("cases"));
        let case = sample_case();
        // Must not panic.
        archive_best_effort(&archive, &case);
    }
}
