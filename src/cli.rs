// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "advocate",
    about = "Per-case agent loop that drives customer-support chat widgets on behalf of an end user",
    version,
    long_about = None,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to an explicit config file; overrides the usual search paths.
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace). Respects RUST_LOG if set.
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the fully resolved configuration (file layers + env overrides) and exit.
    ShowConfig,

    /// Open a new case in the Case Store and print the resulting record.
    ///
    /// Runs classification and the case-level policy check are deferred to
    /// `start-session`; this only persists the case and its opening event.
    CreateCase {
        /// Customer-facing name attached to the case.
        #[arg(long)]
        customer: String,
        /// Free-text description of the customer's issue.
        #[arg(long)]
        issue: String,
        /// Order identifier, if the issue references one.
        #[arg(long)]
        order_id: Option<String>,
        /// What the customer says they want (refund, replacement, ...).
        #[arg(long)]
        desired_outcome: Option<String>,
    },

    /// Replay a scripted sequence of snapshots through a fresh case and print
    /// every lifecycle event the engine emits, plus the final case record.
    ///
    /// This is an operator/debugging tool, not a surface implementation: the
    /// transport is an in-process stand-in, and `snapshots` supplies what a
    /// real browser or portal adapter would otherwise push in live.
    Run {
        #[arg(long)]
        customer: String,
        #[arg(long)]
        issue: String,
        #[arg(long)]
        order_id: Option<String>,
        #[arg(long)]
        desired_outcome: Option<String>,
        /// Path to a JSON array of `WidgetSnapshot` values, fed in order.
        #[arg(long)]
        snapshots: PathBuf,
        /// How long to wait for the case to reach a terminal or
        /// paused-for-approval state before giving up.
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
}
