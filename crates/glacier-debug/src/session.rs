use std::path::Path;

use glacier_term::CommandPort;

/// Drives an external interactive debugger through the terminal.
///
/// The target is assumed to be a conventional line-oriented debug REPL
/// (`pdb`-compatible): commands are sent verbatim and never validated or
/// acknowledged. While no session is active every intent is a silent no-op.
#[derive(Debug, Default)]
pub struct DebugSession {
    active: bool,
}

impl DebugSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Launch the debuggee under the debugger inside the embedded shell.
    ///
    /// Only Python files are supported; the interpreter path is quoted the
    /// same way the code runner quotes paths. The file is addressed by its
    /// base name, so the shell must already be rooted at the file's project.
    pub fn start(
        &mut self,
        port: &impl CommandPort,
        python: &str,
        file: &Path,
    ) -> Result<(), String> {
        if file.extension().and_then(|ext| ext.to_str()) != Some("py") {
            return Err("Debugging only supported for Python files".to_string());
        }

        let Some(name) = file.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            return Err(format!("not a debuggable file: {}", file.display()));
        };

        self.active = true;
        log::info!("starting debug session for {}", file.display());
        port.send(&format!("\"{python}\" -m pdb {name}"));
        Ok(())
    }

    pub fn step_over(&self, port: &impl CommandPort) {
        if self.active {
            port.send("next");
        }
    }

    pub fn step_into(&self, port: &impl CommandPort) {
        if self.active {
            port.send("step");
        }
    }

    pub fn step_out(&self, port: &impl CommandPort) {
        if self.active {
            port.send("return");
        }
    }

    pub fn continue_execution(&self, port: &impl CommandPort) {
        if self.active {
            port.send("continue");
        }
    }

    /// Ask the debugger for the current frame's arguments and locals.
    pub fn inspect_variables(&self, port: &impl CommandPort) {
        if self.active {
            port.send("args");
            port.send("p locals()");
        }
    }

    pub fn show_call_stack(&self, port: &impl CommandPort) {
        if self.active {
            port.send("where");
        }
    }

    /// End the session. The external debugger is not told; the user quits
    /// it in the terminal like any other process.
    pub fn stop(&mut self) {
        self.active = false;
    }
}
