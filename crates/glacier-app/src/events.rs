//! Events the backend sends to whatever frontend embeds it.
//!
//! Everything crossing the boundary goes through `AppEvent`, serialized as
//! tagged JSON so a frontend channel can dispatch on `type`.

use serde::Serialize;

/// Events sent from the backend to the frontend over the workspace channel.
#[derive(Serialize, Clone, Debug)]
#[serde(tag = "type")]
pub enum AppEvent {
    /// A chunk of terminal output (process output, echoed commands, reports).
    Output { text: String },
    /// The project tree changed; carries the new listing, sorted.
    TreeChanged { paths: Vec<String> },
    /// A session was opened on the given project root.
    SessionStarted { root: String },
    /// The session was closed and its terminal discarded.
    SessionClosed,
}
