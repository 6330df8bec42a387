// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use std::time::{Duration, Instant};

use advocate_config::EngineConfig;
use advocate_decider::{DeciderError, LlmDecider};
use advocate_filter::SensitiveFilter;
use advocate_policy::PolicyResult;
use advocate_store::CaseStore;
use advocate_transport::{AgentEventKind, DispatchAction, SurfaceTransport};
use advocate_types::{AgentAction, CaseContext, CaseEventKind, CaseStatus, NewCaseEvent, WidgetSnapshot};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Everything the engine routes into a running session. One channel per
/// session; the loop below is the only reader.
#[derive(Debug)]
pub enum SessionMessage {
    Snapshot(WidgetSnapshot),
    ActionResult {
        action_id: String,
        success: bool,
        error: Option<String>,
    },
    Pause,
    Resume {
        user_input: Option<String>,
    },
    Stop,
}

enum WaitOutcome {
    Snapshot(WidgetSnapshot),
    TimedOut,
    Stopped,
}

enum PauseOutcome {
    Resumed,
    Stopped,
}

/// Outcome of running one pass through the §4.7 per-iteration protocol.
enum IterationOutcome {
    /// The post-dispatch rendezvous resolved with a new snapshot — drive the
    /// next iteration directly, no extra `RequestSnapshot` needed.
    Continue(WidgetSnapshot),
    /// Go back to the READY state and wait (with retries) for a fresh one.
    NeedFreshSnapshot,
    Paused,
    Terminal,
    Stopped,
}

/// Owns one case's live execution context. Spawned by
/// [`crate::AgentLoopEngine::start_session`] as its own task; driven purely
/// by messages on its channel plus the clock.
pub struct SessionLoop {
    pub case_id: String,
    pub context: CaseContext,
    pub paused: bool,
    pub store: Arc<CaseStore>,
    pub decider: Arc<dyn LlmDecider>,
    pub transport: Arc<dyn SurfaceTransport>,
    pub filter: SensitiveFilter,
    pub config: EngineConfig,
    iteration: u32,
    last_action_at: Option<Instant>,
}

impl SessionLoop {
    pub fn new(
        case_id: String,
        context: CaseContext,
        paused: bool,
        store: Arc<CaseStore>,
        decider: Arc<dyn LlmDecider>,
        transport: Arc<dyn SurfaceTransport>,
        config: EngineConfig,
    ) -> Self {
        Self {
            case_id,
            context,
            paused,
            store,
            decider,
            transport,
            filter: SensitiveFilter::new(),
            config,
            iteration: 0,
            last_action_at: None,
        }
    }

    /// Drives the session to completion. Returns once the case reaches a
    /// terminal outcome or `Stop` is observed.
    pub async fn run(mut self, mut rx: mpsc::Receiver<SessionMessage>) {
        let mut snapshot = if self.paused {
            match self.wait_while_paused(&mut rx).await {
                PauseOutcome::Stopped => return,
                PauseOutcome::Resumed => match self.wait_for_fresh_snapshot(&mut rx).await {
                    Some(s) => s,
                    None => return,
                },
            }
        } else {
            match self.wait_for_fresh_snapshot(&mut rx).await {
                Some(s) => s,
                None => return,
            }
        };

        loop {
            if self.paused {
                match self.wait_while_paused(&mut rx).await {
                    PauseOutcome::Stopped => return,
                    PauseOutcome::Resumed => {
                        snapshot = match self.wait_for_fresh_snapshot(&mut rx).await {
                            Some(s) => s,
                            None => return,
                        };
                        continue;
                    }
                }
            }

            match self.run_iteration(snapshot, &mut rx).await {
                IterationOutcome::Continue(s) => snapshot = s,
                IterationOutcome::NeedFreshSnapshot => {
                    snapshot = match self.wait_for_fresh_snapshot(&mut rx).await {
                        Some(s) => s,
                        None => return,
                    };
                }
                IterationOutcome::Paused => continue,
                IterationOutcome::Terminal | IterationOutcome::Stopped => return,
            }
        }
    }

    /// READY-state wait: keep asking the surface for a snapshot until one
    /// arrives, `Stop` is observed, or the caller gives up. Re-issues
    /// `RequestSnapshot` on every timeout — never overlaps an outstanding
    /// wait, since this loop only ever has one wait in flight.
    async fn wait_for_fresh_snapshot(
        &mut self,
        rx: &mut mpsc::Receiver<SessionMessage>,
    ) -> Option<WidgetSnapshot> {
        let timeout = Duration::from_millis(self.config.snapshot_timeout_ms);
        loop {
            if self.paused {
                match self.wait_while_paused(rx).await {
                    PauseOutcome::Stopped => return None,
                    PauseOutcome::Resumed => continue,
                }
            }
            match self.wait_for_message(rx, timeout).await {
                WaitOutcome::Snapshot(s) => return Some(s),
                WaitOutcome::Stopped => return None,
                WaitOutcome::TimedOut => {
                    self.transport.request_snapshot(&self.case_id).await;
                }
            }
        }
    }

    /// Waits indefinitely while `paused`. Stray snapshots arriving in this
    /// state are dropped — the surface may still be pushing unsolicited
    /// state while a human reviews the hold.
    async fn wait_while_paused(&mut self, rx: &mut mpsc::Receiver<SessionMessage>) -> PauseOutcome {
        loop {
            match rx.recv().await {
                None | Some(SessionMessage::Stop) => return PauseOutcome::Stopped,
                Some(SessionMessage::Pause) => {}
                Some(SessionMessage::Resume { user_input }) => {
                    self.paused = false;
                    if let Some(text) = user_input {
                        self.context.record_action(format!("User input: \"{text}\""));
                    }
                    self.transport.request_snapshot(&self.case_id).await;
                    return PauseOutcome::Resumed;
                }
                Some(SessionMessage::ActionResult {
                    action_id,
                    success,
                    error,
                }) => self.handle_action_result(action_id, success, error),
                Some(SessionMessage::Snapshot(_)) => {
                    debug!(case_id = %self.case_id, "dropping unsolicited snapshot while paused");
                }
            }
        }
    }

    /// One-shot rendezvous with a bounded timeout. Processes control and
    /// action-result messages inline without ending the wait — only a
    /// `Snapshot`, `Stop`, or the deadline end it, per the "flags observed
    /// at well-defined checkpoints" design: a `Pause` arriving mid-wait is
    /// recorded but does not interrupt an in-flight rendezvous.
    async fn wait_for_message(
        &mut self,
        rx: &mut mpsc::Receiver<SessionMessage>,
        timeout: Duration,
    ) -> WaitOutcome {
        let sleep = tokio::time::sleep(timeout);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                biased;
                msg = rx.recv() => match msg {
                    None | Some(SessionMessage::Stop) => return WaitOutcome::Stopped,
                    Some(SessionMessage::Snapshot(s)) => return WaitOutcome::Snapshot(s),
                    Some(SessionMessage::Pause) => self.paused = true,
                    Some(SessionMessage::Resume { user_input }) => {
                        self.paused = false;
                        if let Some(text) = user_input {
                            self.context.record_action(format!("User input: \"{text}\""));
                        }
                    }
                    Some(SessionMessage::ActionResult { action_id, success, error }) => {
                        self.handle_action_result(action_id, success, error);
                    }
                },
                _ = &mut sleep => return WaitOutcome::TimedOut,
            }
        }
    }

    fn handle_action_result(&mut self, action_id: String, success: bool, error: Option<String>) {
        if success {
            return;
        }
        let message = error.unwrap_or_else(|| "action failed with no error detail".to_string());
        debug!(case_id = %self.case_id, %action_id, %message, "action dispatch failed");
        self.context.record_action(format!("[FAILED] {message}"));
    }

    async fn run_iteration(
        &mut self,
        snapshot: WidgetSnapshot,
        rx: &mut mpsc::Receiver<SessionMessage>,
    ) -> IterationOutcome {
        if self.iteration >= self.config.max_iterations {
            self.terminate_error("Maximum iterations reached without resolution")
                .await;
            return IterationOutcome::Terminal;
        }

        if let Some(last) = self.last_action_at {
            let min_interval = Duration::from_millis(self.config.min_action_interval_ms);
            let elapsed = last.elapsed();
            if elapsed < min_interval {
                tokio::time::sleep(min_interval - elapsed).await;
            }
        }

        self.iteration += 1;
        self.last_action_at = Some(Instant::now());

        let filtered = self.filter.filter(snapshot);

        let decision = match self.decider.decide(&filtered, &self.context).await {
            Ok(d) => d,
            Err(DeciderError::Transient(message)) => {
                self.transport
                    .agent_event(&self.case_id, AgentEventKind::Error { message })
                    .await;
                return IterationOutcome::NeedFreshSnapshot;
            }
            Err(DeciderError::ContractViolation(message)) => {
                self.transport
                    .agent_event(&self.case_id, AgentEventKind::Error { message })
                    .await;
                return IterationOutcome::NeedFreshSnapshot;
            }
            Err(DeciderError::PermanentInvalid(message)) => {
                self.terminate_error(&message).await;
                return IterationOutcome::Terminal;
            }
        };

        let policy = advocate_policy::evaluate(&decision.action);
        match policy {
            PolicyResult::Blocked { reason } | PolicyResult::NeedsApproval { reason } => {
                self.pause_on_policy(reason).await;
                return IterationOutcome::Paused;
            }
            PolicyResult::Allowed => {}
        }

        self.dispatch(decision.action, rx).await
    }

    async fn pause_on_policy(&mut self, reason: String) {
        self.transport
            .agent_event(
                &self.case_id,
                AgentEventKind::Paused {
                    reason: reason.clone(),
                    needs_input: false,
                    input_prompt: None,
                },
            )
            .await;
        self.paused = true;
        if let Err(err) = self.store.update_status(&self.case_id, CaseStatus::PausedForApproval) {
            warn!(case_id = %self.case_id, %err, "failed to record policy pause");
        }
    }

    async fn dispatch(
        &mut self,
        action: AgentAction,
        rx: &mut mpsc::Receiver<SessionMessage>,
    ) -> IterationOutcome {
        let action_id = format!("{}-{}", self.case_id, self.iteration);

        match action {
            AgentAction::TypeMessage { text } => {
                self.context.record_action(format!("Sent message: \"{text}\""));
                self.transport
                    .agent_event(&self.case_id, AgentEventKind::AgentMessage { text: text.clone() })
                    .await;
                self.transport
                    .agent_event(
                        &self.case_id,
                        AgentEventKind::Action {
                            description: "Sending message...".to_string(),
                        },
                    )
                    .await;
                self.transport
                    .execute_action(&self.case_id, &action_id, DispatchAction::TypeMessage { text })
                    .await;
                self.wait_after_dispatch(rx, Duration::from_millis(self.config.wait_after_message_ms))
                    .await
            }
            AgentAction::ClickButton { label, .. } => {
                self.context.record_action(format!("Clicked: \"{label}\""));
                self.transport
                    .agent_event(
                        &self.case_id,
                        AgentEventKind::Action {
                            description: format!("Clicking \"{label}\"..."),
                        },
                    )
                    .await;
                self.transport
                    .execute_action(
                        &self.case_id,
                        &action_id,
                        DispatchAction::ClickButton { button_label: label },
                    )
                    .await;
                self.wait_after_dispatch(
                    rx,
                    Duration::from_millis(self.config.wait_after_click_or_upload_ms),
                )
                .await
            }
            AgentAction::UploadFile { description } => {
                self.context
                    .record_action(format!("Uploaded: \"{description}\""));
                self.transport
                    .agent_event(
                        &self.case_id,
                        AgentEventKind::Action {
                            description: "Uploading file...".to_string(),
                        },
                    )
                    .await;
                self.transport
                    .execute_action(
                        &self.case_id,
                        &action_id,
                        DispatchAction::UploadFile {
                            file_description: description,
                        },
                    )
                    .await;
                self.wait_after_dispatch(
                    rx,
                    Duration::from_millis(self.config.wait_after_click_or_upload_ms),
                )
                .await
            }
            AgentAction::Wait { duration_ms, reason } => {
                self.context.record_action(format!("Waiting: {reason}"));
                self.transport
                    .agent_event(
                        &self.case_id,
                        AgentEventKind::Waiting {
                            reason: reason.clone(),
                        },
                    )
                    .await;
                self.transport
                    .execute_action(
                        &self.case_id,
                        &action_id,
                        DispatchAction::Wait { duration_ms, reason },
                    )
                    .await;
                let capped = duration_ms.min(self.config.wait_after_message_ms) + 5_000;
                self.wait_after_dispatch(rx, Duration::from_millis(capped)).await
            }
            AgentAction::RequestHumanReview {
                reason,
                needs_input,
                input_prompt,
            } => {
                self.context.record_action(format!("Requested human review: {reason}"));
                self.transport
                    .agent_event(
                        &self.case_id,
                        AgentEventKind::Paused {
                            reason: reason.clone(),
                            needs_input,
                            input_prompt,
                        },
                    )
                    .await;
                self.paused = true;
                if let Err(err) = self.store.update_status(&self.case_id, CaseStatus::PausedForApproval) {
                    warn!(case_id = %self.case_id, %err, "failed to record human-review pause");
                }
                if let Err(err) = self.store.append_event(
                    &self.case_id,
                    NewCaseEvent::new(CaseEventKind::PolicyGate, reason),
                ) {
                    warn!(case_id = %self.case_id, %err, "failed to record policy-gate event");
                }
                IterationOutcome::Paused
            }
            AgentAction::MarkResolved { summary } => {
                self.context.record_action(format!("Resolved: {summary}"));
                self.transport
                    .agent_event(
                        &self.case_id,
                        AgentEventKind::Completed {
                            summary: summary.clone(),
                        },
                    )
                    .await;
                if let Err(err) = self.store.complete(&self.case_id, summary.clone()) {
                    warn!(case_id = %self.case_id, %err, "failed to record case completion");
                }
                self.transport.case_completed(&self.case_id, &summary).await;
                IterationOutcome::Terminal
            }
        }
    }

    async fn wait_after_dispatch(
        &mut self,
        rx: &mut mpsc::Receiver<SessionMessage>,
        timeout: Duration,
    ) -> IterationOutcome {
        match self.wait_for_message(rx, timeout).await {
            WaitOutcome::Snapshot(s) => IterationOutcome::Continue(s),
            WaitOutcome::Stopped => IterationOutcome::Stopped,
            WaitOutcome::TimedOut => {
                self.transport.request_snapshot(&self.case_id).await;
                IterationOutcome::NeedFreshSnapshot
            }
        }
    }

    async fn terminate_error(&mut self, message: &str) {
        self.transport.case_error(&self.case_id, message).await;
        if let Err(err) = self.store.fail(&self.case_id, message) {
            warn!(case_id = %self.case_id, %err, "failed to record case failure");
        }
    }
}
