//! Outbox relay: committed outbox rows onto the transport.
//!
//! One relay runs per transport, typically on its own
//! [`OutboxRelayThread`]. It holds no state of its own; stopping and
//! restarting it simply resumes from the undispatched rows.

mod backoff;
#[allow(clippy::module_inception)]
mod relay;
mod thread;

pub use backoff::Backoff;
pub use relay::{DrainResult, OutboxRelay};
pub use thread::{OutboxRelayThread, RelayStats};
