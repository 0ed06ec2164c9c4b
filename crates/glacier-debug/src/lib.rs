//! glacier-debug: line-oriented debugger front-end for Glacier.
//!
//! Two small pieces: the breakpoint toggle-set shown in the debug panel,
//! and a session driver that translates step/continue/inspect intents into
//! the fixed command vocabulary of a conventional frame-based debugger
//! REPL, dispatched blindly through a [`glacier_term::CommandPort`]. No
//! acknowledgment or response parsing happens here — correctness ends at
//! "command was sent".

pub mod breakpoints;
pub mod session;

pub use breakpoints::BreakpointSet;
pub use session::DebugSession;
