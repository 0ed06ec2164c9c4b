//! Output pump: the single consumer of the terminal sink channel.
//!
//! Reader threads and commands produce text chunks; this task is the only
//! thing that mutates the shared transcript. It appends each chunk and
//! forwards it to the frontend event channel, standing in for the UI-thread
//! marshal a GUI shell would do.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use glacier_term::TerminalBuffer;

use crate::events::AppEvent;

/// Start the pump for one session's sink channel.
///
/// Runs until the sink senders are all dropped or the stop channel fires.
/// Must be called from within a tokio runtime.
pub fn start_output_pump(
    mut sink_rx: mpsc::UnboundedReceiver<String>,
    buffer: Arc<Mutex<TerminalBuffer>>,
    events: mpsc::UnboundedSender<AppEvent>,
    mut stop_rx: mpsc::Receiver<()>,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                chunk = sink_rx.recv() => {
                    let Some(text) = chunk else { return };
                    match buffer.lock() {
                        Ok(mut buf) => buf.append(&text),
                        Err(_) => return, // poisoned transcript, stop pumping
                    }
                    let _ = events.send(AppEvent::Output { text });
                }
                _ = stop_rx.recv() => return,
            }
        }
    });
}
