use tokio::sync::mpsc;

/// Sending half of the terminal output channel.
///
/// Cloned into the bridge and its reader threads. Everything user-visible
/// (process output, echoed commands, error reports) goes through here as
/// text chunks; the receiving half is drained by a single consumer task so
/// the shared transcript is only ever mutated from one place.
#[derive(Clone)]
pub struct OutputSink {
    tx: mpsc::UnboundedSender<String>,
}

impl OutputSink {
    /// Create a sink plus the receiver the consumer drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Append a chunk of text to the output stream.
    ///
    /// Returns `false` if the consumer has gone away. Reader loops use that
    /// as their cue to stop.
    pub fn push(&self, text: impl Into<String>) -> bool {
        self.tx.send(text.into()).is_ok()
    }

    /// Append a single character to the output stream.
    pub fn push_char(&self, ch: char) -> bool {
        self.push(ch.to_string())
    }
}
