// SPDX-License-Identifier: Apache-2.0

//! The duplex channel the Agent Loop Engine is driven through. `SurfaceTransport`
//! is the consumed interface: the engine only ever calls its outbound methods
//! and receives inbound messages back through whatever channel the
//! implementation wires up.

mod inmemory;
mod messages;

pub use inmemory::{InMemoryTransport, OutboundRecord};
pub use messages::{AgentEventKind, DispatchAction, TransportInbound};

use advocate_types::WidgetSnapshot;
use async_trait::async_trait;

/// Outbound half of the transport, as seen by the engine. An implementation
/// forwards these to the real surface (browser extension, portal adapter,
/// or — for tests — an in-memory queue).
#[async_trait]
pub trait SurfaceTransport: Send + Sync {
    /// Polite pull: ask the surface to send a fresh `Snapshot`.
    async fn request_snapshot(&self, case_id: &str);

    /// Fire-and-await: ask the surface to perform `action`. The surface must
    /// eventually reply with an `ActionResult` carrying the same `action_id`.
    async fn execute_action(&self, case_id: &str, action_id: &str, action: DispatchAction);

    /// One-way lifecycle notification for UI consumers.
    async fn agent_event(&self, case_id: &str, event: AgentEventKind);

    async fn case_completed(&self, case_id: &str, summary: &str);

    async fn case_error(&self, case_id: &str, message: &str);
}

/// Convenience re-export so callers constructing snapshots for tests don't
/// need to reach into `advocate_types` separately.
pub type Snapshot = WidgetSnapshot;
