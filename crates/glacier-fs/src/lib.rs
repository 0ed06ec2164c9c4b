//! glacier-fs: project-tree observation for Glacier.
//!
//! Detects additions and removals anywhere under the project root without
//! OS-level change notifications: a repeating timer recomputes a full
//! snapshot of the tree and compares it to the previous one by set
//! equality. Eventually consistent, latency bound by the poll interval.

pub mod poller;
pub mod snapshot;

pub use poller::{start_tree_poller, TreeEvent, DEFAULT_POLL_INTERVAL};
pub use snapshot::snapshot;
