use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::sink::OutputSink;

/// Anything that accepts shell command strings.
///
/// Implemented by [`ShellBridge`]; other components (debugger front-end,
/// code runner) dispatch through this so they can be exercised against a
/// recording fake in tests.
pub trait CommandPort {
    fn send(&self, command: &str);
}

/// Owns one interactive shell child process and relays its output.
///
/// The process is spawned with stdin/stdout/stderr piped. Two dedicated OS
/// threads (one per output stream) block on reads and forward decoded text
/// to the [`OutputSink`]; they never touch consumer state directly. Commands
/// are written to stdin from whatever thread calls [`ShellBridge::send`].
///
/// Lifecycle is one-way: a bridge that failed to spawn, was shut down, or
/// whose child exited stays dead. Restarting means dropping the bridge and
/// constructing a new one.
pub struct ShellBridge {
    running: Arc<AtomicBool>,
    stdin: Mutex<Option<ChildStdin>>,
    child: Mutex<Option<Child>>,
    sink: OutputSink,
}

impl ShellBridge {
    /// Spawn the shell with the given working directory.
    ///
    /// If `shell` is `None`, uses the platform default (see [`default_shell`]).
    /// Spawn failure is reported as a line on the sink rather than returned;
    /// the bridge comes back dead and every `send` on it reports an error.
    pub fn spawn(shell: Option<&str>, working_dir: &Path, sink: OutputSink) -> Self {
        let shell_path = match shell {
            Some(s) => s.to_string(),
            None => default_shell(),
        };

        let spawned = Command::new(&shell_path)
            .current_dir(working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                log::warn!("shell spawn failed in {}: {e}", working_dir.display());
                sink.push(format!("Failed to start terminal process: {e}\n"));
                return Self::dead(sink);
            }
        };

        let running = Arc::new(AtomicBool::new(true));

        // stdout/stderr are always piped, so these are present on a fresh child.
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdin = child.stdin.take();

        if let Some(stream) = stdout {
            start_reader_thread("shell-stdout", stream, sink.clone(), Arc::clone(&running));
        }
        if let Some(stream) = stderr {
            start_reader_thread("shell-stderr", stream, sink.clone(), Arc::clone(&running));
        }

        sink.push(format!("Terminal started in: {}\n", working_dir.display()));
        sink.push(format!("Type commands below...\n{}\n", "=".repeat(50)));

        Self {
            running,
            stdin: Mutex::new(stdin),
            child: Mutex::new(Some(child)),
            sink,
        }
    }

    fn dead(sink: OutputSink) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            stdin: Mutex::new(None),
            child: Mutex::new(None),
            sink,
        }
    }

    /// Write a command line to the shell's stdin and echo it to the sink.
    ///
    /// A trailing newline is appended and the stream flushed immediately.
    /// Failures (no process, closed stdin) are reported per call as a line
    /// on the sink; the bridge stays callable afterwards.
    pub fn send(&self, command: &str) {
        let mut guard = match self.stdin.lock() {
            Ok(g) => g,
            Err(_) => {
                self.sink.push("Error sending command: stdin lock poisoned\n");
                return;
            }
        };

        let Some(stdin) = guard.as_mut() else {
            self.sink
                .push("Error sending command: terminal is not running\n");
            return;
        };

        match writeln!(stdin, "{command}").and_then(|_| stdin.flush()) {
            Ok(()) => {
                self.sink.push(format!("> {command}\n"));
            }
            Err(e) => {
                self.sink.push(format!("Error sending command: {e}\n"));
            }
        }
    }

    /// Check whether the child process is still alive.
    pub fn is_alive(&self) -> bool {
        let mut guard = match self.child.lock() {
            Ok(g) => g,
            Err(_) => return false,
        };
        match guard.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Stop the bridge: clear the running flag and terminate the child.
    ///
    /// Reader threads exit on their next failed read. Idempotent, never
    /// panics, safe to call when nothing was ever started. Termination is
    /// forceful and unacknowledged; a child that ignores it is left to the
    /// OS (no timeout is enforced).
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::Relaxed);

        // Closing stdin both unblocks a shell waiting for input and makes
        // later sends fail fast with a report instead of touching a dead pipe.
        if let Ok(mut stdin) = self.stdin.lock() {
            stdin.take();
        }

        if let Ok(mut guard) = self.child.lock() {
            if let Some(child) = guard.as_mut() {
                if matches!(child.try_wait(), Ok(None)) {
                    let _ = child.kill();
                }
                let _ = child.wait();
            }
            guard.take();
        }
    }
}

impl Drop for ShellBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl CommandPort for ShellBridge {
    fn send(&self, command: &str) {
        ShellBridge::send(self, command);
    }
}

/// Returns the platform shell: `cmd.exe` on Windows, `$SHELL` falling back
/// to `/bin/sh` elsewhere.
pub fn default_shell() -> String {
    if cfg!(windows) {
        "cmd.exe".to_string()
    } else {
        std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
    }
}

fn start_reader_thread(
    name: &str,
    stream: impl Read + Send + 'static,
    sink: OutputSink,
    running: Arc<AtomicBool>,
) {
    std::thread::Builder::new()
        .name(name.to_string())
        .spawn(move || relay_output(stream, sink, running))
        .expect("failed to spawn reader thread");
}

/// Reader loop: one character per iteration, handed to the sink channel.
///
/// EOF and read errors end the loop silently; the running flag is checked
/// cooperatively each round so shutdown can stop a loop that still has a
/// readable stream.
fn relay_output(mut stream: impl Read, sink: OutputSink, running: Arc<AtomicBool>) {
    while running.load(Ordering::Relaxed) {
        match read_one_char(&mut stream) {
            Some(ch) => {
                if !sink.push_char(ch) {
                    return;
                }
            }
            None => return,
        }
    }
}

/// Read a single character, assembling UTF-8 sequences byte by byte.
///
/// Undecodable bytes come back as U+FFFD instead of failing the stream.
/// Returns `None` on EOF or a read error.
fn read_one_char(stream: &mut impl Read) -> Option<char> {
    let mut first = [0u8; 1];
    match stream.read(&mut first) {
        Ok(0) | Err(_) => return None,
        Ok(_) => {}
    }

    let len = match utf8_sequence_len(first[0]) {
        Some(len) => len,
        None => return Some(char::REPLACEMENT_CHARACTER),
    };

    if len == 1 {
        return Some(first[0] as char);
    }

    let mut seq = [0u8; 4];
    seq[0] = first[0];
    if stream.read_exact(&mut seq[1..len]).is_err() {
        return Some(char::REPLACEMENT_CHARACTER);
    }

    match std::str::from_utf8(&seq[..len]) {
        Ok(s) => s.chars().next(),
        Err(_) => Some(char::REPLACEMENT_CHARACTER),
    }
}

/// Expected sequence length for a UTF-8 lead byte; `None` for a byte that
/// cannot start a sequence.
fn utf8_sequence_len(byte: u8) -> Option<usize> {
    match byte {
        0x00..=0x7F => Some(1),
        0xC0..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF7 => Some(4),
        _ => None,
    }
}
