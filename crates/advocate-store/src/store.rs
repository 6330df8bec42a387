// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use advocate_archive::{archive_best_effort, ConversationArchive};
use advocate_types::{
    Case, CaseEventKind, CaseStatus, ExecutionMode, NewCaseEvent,
};
use chrono::Utc;
use uuid::Uuid;

use crate::classify::{classify_category, strategy_for_category};
use crate::error::StoreError;

use advocate_policy::requires_case_level_hold;

/// Fields a caller supplies when opening a new case; everything derived
/// (id, category, strategy, status, timestamps) is the store's to assign.
#[derive(Debug, Clone)]
pub struct NewCase {
    pub customer_name: String,
    pub issue: String,
    pub order_id: Option<String>,
    pub attachment_paths: Vec<String>,
    pub desired_outcome: Option<String>,
    pub execution_mode: ExecutionMode,
}

impl NewCase {
    pub fn new(customer_name: impl Into<String>, issue: impl Into<String>) -> Self {
        Self {
            customer_name: customer_name.into(),
            issue: issue.into(),
            order_id: None,
            attachment_paths: Vec::new(),
            desired_outcome: None,
            execution_mode: ExecutionMode::default(),
        }
    }
}

/// Owns every case's state and serializes mutations per case. Different
/// cases may be mutated concurrently; the same case is always mutated
/// through its own lock, one caller at a time.
pub struct CaseStore {
    archive: ConversationArchive,
    cases: RwLock<HashMap<String, Mutex<Case>>>,
}

impl CaseStore {
    pub fn new(archive: ConversationArchive) -> Self {
        Self {
            archive,
            cases: RwLock::new(HashMap::new()),
        }
    }

    pub fn create(&self, input: NewCase) -> Case {
        let now = Utc::now();
        let category = classify_category(&input.issue);
        let strategy = strategy_for_category(category);
        let case = Case {
            id: Uuid::new_v4().to_string(),
            customer_name: input.customer_name,
            issue: input.issue,
            order_id: input.order_id,
            attachment_paths: input.attachment_paths,
            category,
            strategy,
            status: CaseStatus::Queued,
            execution_mode: input.execution_mode,
            desired_outcome: input.desired_outcome,
            created_at: now,
            updated_at: now,
            events: vec![
                stamped_event(
                    now,
                    CaseEventKind::CaseCreated,
                    "case created".to_string(),
                ),
                stamped_event(
                    now,
                    CaseEventKind::IntentInferred,
                    format!("classified as {category} / {strategy}"),
                ),
            ],
            resolution_summary: None,
            last_error: None,
        };

        let id = case.id.clone();
        archive_best_effort(&self.archive, &case);
        self.cases
            .write()
            .expect("case store lock poisoned")
            .insert(id, Mutex::new(case.clone()));
        case
    }

    /// Case-level policy gate run once before the engine's first iteration.
    /// High-risk issue language forces the case straight to
    /// `paused_for_approval` instead of `running`.
    pub fn start(&self, id: &str) -> Result<Case, StoreError> {
        let issue = self
            .get(id)
            .ok_or_else(|| StoreError::CaseNotFound(id.to_string()))?
            .issue;
        match requires_case_level_hold(&issue) {
            Some(reason) => {
                let case = self.update_status(id, CaseStatus::PausedForApproval)?;
                self.append_event(id, NewCaseEvent::new(CaseEventKind::PolicyGate, reason))?;
                Ok(case)
            }
            None => self.update_status(id, CaseStatus::Running),
        }
    }

    pub fn get(&self, id: &str) -> Option<Case> {
        let cases = self.cases.read().expect("case store lock poisoned");
        cases
            .get(id)
            .map(|m| m.lock().expect("case lock poisoned").clone())
    }

    pub fn list(&self) -> Vec<Case> {
        let cases = self.cases.read().expect("case store lock poisoned");
        let mut all: Vec<Case> = cases
            .values()
            .map(|m| m.lock().expect("case lock poisoned").clone())
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }

    pub fn update_status(&self, id: &str, new_status: CaseStatus) -> Result<Case, StoreError> {
        self.with_case_mut(id, |case| {
            if !case.status.can_transition_to(new_status) {
                return Err(StoreError::InvalidTransition {
                    case_id: case.id.clone(),
                    from: case.status.to_string(),
                    to: new_status.to_string(),
                });
            }
            case.status = new_status;
            case.updated_at = Utc::now();
            Ok(())
        })
    }

    pub fn append_event(&self, id: &str, event: NewCaseEvent) -> Result<Case, StoreError> {
        self.with_case_mut(id, |case| {
            if case.status.is_terminal() {
                return Err(StoreError::InvalidTransition {
                    case_id: case.id.clone(),
                    from: case.status.to_string(),
                    to: "<new event>".to_string(),
                });
            }
            case.events.push(stamped_event(Utc::now(), event.kind, event.message));
            case.updated_at = Utc::now();
            Ok(())
        })
    }

    /// Transition `running | paused_for_approval -> completed`. Idempotent:
    /// calling this on an already-completed case is a no-op that returns the
    /// existing case rather than an error.
    pub fn complete(&self, id: &str, summary: impl Into<String>) -> Result<Case, StoreError> {
        let summary = summary.into();
        self.with_case_mut(id, |case| {
            if case.status == CaseStatus::Completed {
                return Ok(());
            }
            if !case.status.can_transition_to(CaseStatus::Completed) {
                return Err(StoreError::InvalidTransition {
                    case_id: case.id.clone(),
                    from: case.status.to_string(),
                    to: CaseStatus::Completed.to_string(),
                });
            }
            case.status = CaseStatus::Completed;
            case.resolution_summary = Some(summary.clone());
            case.updated_at = Utc::now();
            case.events.push(stamped_event(
                Utc::now(),
                CaseEventKind::CaseCompleted,
                summary.clone(),
            ));
            Ok(())
        })
    }

    /// Transition any non-terminal status to `failed`.
    pub fn fail(&self, id: &str, error_message: impl Into<String>) -> Result<Case, StoreError> {
        let error_message = error_message.into();
        self.with_case_mut(id, |case| {
            if !case.status.can_transition_to(CaseStatus::Failed) {
                return Err(StoreError::InvalidTransition {
                    case_id: case.id.clone(),
                    from: case.status.to_string(),
                    to: CaseStatus::Failed.to_string(),
                });
            }
            case.status = CaseStatus::Failed;
            case.last_error = Some(error_message.clone());
            case.updated_at = Utc::now();
            case.events.push(stamped_event(
                Utc::now(),
                CaseEventKind::CaseFailed,
                error_message.clone(),
            ));
            Ok(())
        })
    }

    fn with_case_mut(
        &self,
        id: &str,
        f: impl FnOnce(&mut Case) -> Result<(), StoreError>,
    ) -> Result<Case, StoreError> {
        let cases = self.cases.read().expect("case store lock poisoned");
        let case_lock = cases
            .get(id)
            .ok_or_else(|| StoreError::CaseNotFound(id.to_string()))?;
        let mut case = case_lock.lock().expect("case lock poisoned");
        f(&mut case)?;
        let snapshot = case.clone();
        archive_best_effort(&self.archive, &snapshot);
        Ok(snapshot)
    }
}

fn stamped_event(
    at: chrono::DateTime<Utc>,
    kind: CaseEventKind,
    message: String,
) -> advocate_types::CaseEvent {
    advocate_types::CaseEvent {
        at,
        kind,
        message,
        meta: None,
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CaseStore {
        let tmp = tempfile::tempdir().unwrap();
        CaseStore::new(ConversationArchive::new(tmp.path().to_path_buf()))
    }

    #[test]
    fn create_assigns_id_and_queued_status() {
        let store = store();
        let case = store.create(NewCase::new("Asha Patel", "My order arrived damaged"));
        assert!(!case.id.is_empty());
        assert_eq!(case.status, CaseStatus::Queued);
        assert_eq!(case.events.len(), 2);
    }

    #[test]
    fn get_returns_a_clone_not_a_live_reference() {
        let store = store();
        let case = store.create(NewCase::new("Asha", "damaged item"));
        let mut fetched = store.get(&case.id).unwrap();
        fetched.customer_name = "mutated".into();
        // Store's own copy is untouched
        assert_eq!(store.get(&case.id).unwrap().customer_name, "Asha");
    }

    #[test]
    fn list_is_sorted_created_at_descending() {
        let store = store();
        let first = store.create(NewCase::new("A", "issue one"));
        let second = store.create(NewCase::new("B", "issue two"));
        let listed = store.list();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[test]
    fn update_status_validates_transitions() {
        let store = store();
        let case = store.create(NewCase::new("A", "issue"));
        let updated = store.update_status(&case.id, CaseStatus::Running).unwrap();
        assert_eq!(updated.status, CaseStatus::Running);

        let err = store.update_status(&case.id, CaseStatus::Queued);
        assert!(err.is_err());
    }

    #[test]
    fn update_status_missing_case_errors() {
        let store = store();
        let err = store.update_status("nope", CaseStatus::Running);
        assert!(matches!(err, Err(StoreError::CaseNotFound(_))));
    }

    #[test]
    fn complete_is_idempotent() {
        let store = store();
        let case = store.create(NewCase::new("A", "issue"));
        store.update_status(&case.id, CaseStatus::Running).unwrap();
        let first = store.complete(&case.id, "refund issued").unwrap();
        let second = store.complete(&case.id, "ignored summary").unwrap();
        assert_eq!(first.resolution_summary, second.resolution_summary);
        assert_eq!(second.resolution_summary.unwrap(), "refund issued");
    }

    #[test]
    fn fail_transitions_any_nonterminal_status() {
        let store = store();
        let case = store.create(NewCase::new("A", "issue"));
        let failed = store.fail(&case.id, "decider crashed").unwrap();
        assert_eq!(failed.status, CaseStatus::Failed);
        assert_eq!(failed.last_error.unwrap(), "decider crashed");
    }

    #[test]
    fn append_event_refused_on_terminal_case() {
        let store = store();
        let case = store.create(NewCase::new("A", "issue"));
        store.fail(&case.id, "boom").unwrap();
        let err = store.append_event(
            &case.id,
            NewCaseEvent::new(CaseEventKind::AutomationStep, "too late"),
        );
        assert!(err.is_err());
    }

    #[test]
    fn append_event_stamps_timestamp_and_appends() {
        let store = store();
        let case = store.create(NewCase::new("A", "issue"));
        let updated = store
            .append_event(
                &case.id,
                NewCaseEvent::new(CaseEventKind::AutomationStep, "clicked button"),
            )
            .unwrap();
        assert_eq!(updated.events.len(), 3);
        assert_eq!(updated.events[2].message, "clicked button");
    }

    #[test]
    fn start_goes_straight_to_running_for_ordinary_issue() {
        let store = store();
        let case = store.create(NewCase::new("A", "Package arrived damaged"));
        let started = store.start(&case.id).unwrap();
        assert_eq!(started.status, CaseStatus::Running);
    }

    #[test]
    fn start_holds_for_high_risk_issue_language() {
        let store = store();
        let case = store.create(NewCase::new("A", "I'm considering legal action, this is fraud"));
        let started = store.start(&case.id).unwrap();
        assert_eq!(started.status, CaseStatus::PausedForApproval);
        assert!(started
            .events
            .iter()
            .any(|e| e.kind == CaseEventKind::PolicyGate));
    }
}
