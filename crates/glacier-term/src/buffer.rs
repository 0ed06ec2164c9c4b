/// Append-only transcript of everything the terminal pane has shown.
///
/// Appended to by the output pump as chunks arrive from the sink channel,
/// read by whoever renders the pane. Cleared only when a session is torn
/// down and replaced.
#[derive(Default)]
pub struct TerminalBuffer {
    text: String,
}

impl TerminalBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk to the end of the transcript.
    pub fn append(&mut self, chunk: &str) {
        self.text.push_str(chunk);
    }

    /// The full transcript so far.
    pub fn contents(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Reset the transcript. Session teardown only.
    pub fn clear(&mut self) {
        self.text.clear();
    }
}
