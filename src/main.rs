// SPDX-License-Identifier: Apache-2.0

mod cli;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use advocate_archive::ConversationArchive;
use advocate_decider::{AzureOpenAiDecider, LlmDecider, ScriptedDecider};
use advocate_engine::AgentLoopEngine;
use advocate_store::{CaseStore, NewCase};
use advocate_transport::InMemoryTransport;
use advocate_types::{CaseStatus, WidgetSnapshot};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::ShowConfig => {
            let config = advocate_config::load(cli.config.as_deref())?;
            println!("{}", serde_yaml::to_string(&config).unwrap_or_default());
            Ok(())
        }
        Commands::CreateCase {
            customer,
            issue,
            order_id,
            desired_outcome,
        } => {
            let config = advocate_config::load(cli.config.as_deref())?;
            let store = CaseStore::new(ConversationArchive::new(config.archive.root));
            let mut new_case = NewCase::new(customer.clone(), issue.clone());
            new_case.order_id = order_id.clone();
            new_case.desired_outcome = desired_outcome.clone();
            let case = store.create(new_case);
            println!("{}", serde_json::to_string_pretty(&case)?);
            Ok(())
        }
        Commands::Run {
            customer,
            issue,
            order_id,
            desired_outcome,
            snapshots,
            timeout_secs,
        } => {
            run_scenario(
                &cli,
                customer,
                issue,
                order_id.clone(),
                desired_outcome.clone(),
                snapshots,
                *timeout_secs,
            )
            .await
        }
    }
}

/// Drive one case end to end against a scripted snapshot sequence, printing
/// every event the Agent Loop Engine sends to the transport as it happens.
///
/// Stands in for a real surface adapter (browser extension, portal hook):
/// the engine never knows its transport is an in-memory stub rather than a
/// live chat widget.
async fn run_scenario(
    cli: &Cli,
    customer: &str,
    issue: &str,
    order_id: Option<String>,
    desired_outcome: Option<String>,
    snapshots_path: &std::path::Path,
    timeout_secs: u64,
) -> anyhow::Result<()> {
    let config = advocate_config::load(cli.config.as_deref())?;

    let text = std::fs::read_to_string(snapshots_path)
        .with_context(|| format!("reading {}", snapshots_path.display()))?;
    let snapshots: Vec<WidgetSnapshot> =
        serde_json::from_str(&text).context("parsing snapshots as a JSON array")?;

    let store = Arc::new(CaseStore::new(ConversationArchive::new(
        config.archive.root.clone(),
    )));
    let decider = build_decider(&config.llm);
    let engine = AgentLoopEngine::new(store.clone(), decider, config.engine);
    let transport = Arc::new(InMemoryTransport::new());

    let mut new_case = NewCase::new(customer.to_string(), issue.to_string());
    new_case.order_id = order_id;
    new_case.desired_outcome = desired_outcome;
    let case = store.create(new_case);

    engine.start_session(&case.id, transport.clone()).await?;

    for snapshot in snapshots {
        engine.ingest_snapshot(&case.id, snapshot).await;
    }

    let deadline = tokio::time::Instant::now() + Duration::from_secs(timeout_secs);
    let mut printed = 0;
    let result = loop {
        let records = transport.records();
        for record in &records[printed..] {
            println!("{record:?}");
        }
        printed = records.len();

        if let Some(case) = store.get(&case.id) {
            if matches!(
                case.status,
                CaseStatus::Completed | CaseStatus::Failed | CaseStatus::PausedForApproval
            ) {
                break Ok(case);
            }
        }
        if tokio::time::Instant::now() >= deadline {
            break Err(anyhow::anyhow!(
                "case {} did not reach a terminal state within {timeout_secs}s",
                case.id
            ));
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    };

    engine.stop_session(&case.id).await;
    let case = result?;
    println!("{}", serde_json::to_string_pretty(&case)?);
    Ok(())
}

/// Real backend when the `[llm]` config section is fully populated;
/// otherwise a decider that always waits, so a run without credentials still
/// exercises the Case Store and transport instead of failing outright.
fn build_decider(llm: &advocate_config::LlmConfig) -> Arc<dyn LlmDecider> {
    match AzureOpenAiDecider::from_config(llm) {
        Some(decider) => Arc::new(decider),
        None => {
            warn!("no [llm] backend configured, falling back to a decider that always waits");
            Arc::new(ScriptedDecider::new(vec![]))
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
