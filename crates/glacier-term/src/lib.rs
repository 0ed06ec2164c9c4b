//! glacier-term: embedded shell process management for Glacier.
//!
//! This crate owns the child shell process behind the IDE's terminal pane.
//! It spawns the process with piped stdio, relays its output to a consumer
//! channel from two dedicated reader threads, and writes line-oriented
//! commands back to its stdin.
//!
//! # Architecture
//!
//! - [`ShellBridge`] — Child process lifecycle (spawn, send, shutdown) and
//!   the two output-reader threads.
//! - [`OutputSink`] — The channel handle reader threads and commands report
//!   through. The receiving side is drained by a single consumer task that
//!   owns the [`TerminalBuffer`].
//! - [`TerminalBuffer`] — The append-only terminal transcript.
//! - [`CommandPort`] — The seam other components use to dispatch command
//!   strings without holding a concrete bridge.

pub mod bridge;
pub mod buffer;
pub mod sink;

pub use bridge::{default_shell, CommandPort, ShellBridge};
pub use buffer::TerminalBuffer;
pub use sink::OutputSink;
