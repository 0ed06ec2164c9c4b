//! Workspace state: one project root, one live shell session, and the
//! collaborators that hang off them (tabs, breakpoints, config).
//!
//! Session lifecycle is replace-not-mutate: opening a folder tears down the
//! previous bridge, pump, and poller and builds fresh ones; a bridge is
//! never restarted in place.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use glacier_config::Config;
use glacier_debug::{BreakpointSet, DebugSession};
use glacier_fs::{start_tree_poller, TreeEvent, DEFAULT_POLL_INTERVAL};
use glacier_term::{OutputSink, ShellBridge, TerminalBuffer};

use crate::editor::{detect_language, TabManager};
use crate::events::AppEvent;
use crate::pump::start_output_pump;
use crate::runner;
use crate::translate::{self, TextTransform, PSEUDO_EXTENSION};

/// The whole backend: session, terminal transcript, tabs, breakpoints,
/// configuration, and the event channel to the frontend.
///
/// Session-touching operations (`open_folder`, `close_folder`) spawn the
/// pump and poller tasks and must run within a tokio runtime.
pub struct Workspace {
    config: Config,
    config_path: Option<PathBuf>,
    project_root: Arc<Mutex<Option<PathBuf>>>,
    bridge: Option<Arc<ShellBridge>>,
    sink: Option<OutputSink>,
    buffer: Arc<Mutex<TerminalBuffer>>,
    pump_stop: Option<mpsc::Sender<()>>,
    poller_stop: Option<mpsc::Sender<()>>,
    poll_interval: Duration,
    tabs: TabManager,
    breakpoints: BreakpointSet,
    debug: DebugSession,
    events: mpsc::UnboundedSender<AppEvent>,
}

impl Workspace {
    /// Build a workspace with no session. Returns the receiving half of the
    /// frontend event channel.
    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
    ) -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let workspace = Self {
            config,
            config_path,
            project_root: Arc::new(Mutex::new(None)),
            bridge: None,
            sink: None,
            buffer: Arc::new(Mutex::new(TerminalBuffer::new())),
            pump_stop: None,
            poller_stop: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            tabs: TabManager::new(),
            breakpoints: BreakpointSet::new(),
            debug: DebugSession::new(),
            events,
        };
        (workspace, events_rx)
    }

    /// Override the tree poll interval for sessions opened after this call.
    pub fn set_poll_interval(&mut self, interval: Duration) {
        self.poll_interval = interval;
    }

    // ---- session lifecycle ----

    /// Open a project folder, replacing any live session.
    ///
    /// The folder is created if missing. The old bridge, pump, and poller
    /// are torn down and the transcript truncated before the new shell is
    /// spawned rooted at `path`. If the folder carries a `venv`, it is
    /// activated in the fresh shell and the python interpreter repointed.
    pub fn open_folder(&mut self, path: &Path) -> Result<(), String> {
        fs::create_dir_all(path)
            .map_err(|e| format!("failed to open folder {}: {e}", path.display()))?;

        self.teardown_session();

        // Fresh transcript per session. The old pump keeps the old buffer,
        // so a straggling chunk can never leak into the new session.
        self.buffer = Arc::new(Mutex::new(TerminalBuffer::new()));

        if let Ok(mut root) = self.project_root.lock() {
            *root = Some(path.to_path_buf());
        }

        let (sink, sink_rx) = OutputSink::channel();
        let bridge = Arc::new(ShellBridge::spawn(None, path, sink.clone()));

        let (pump_stop_tx, pump_stop_rx) = mpsc::channel(1);
        start_output_pump(
            sink_rx,
            Arc::clone(&self.buffer),
            self.events.clone(),
            pump_stop_rx,
        );

        let (tree_tx, mut tree_rx) = mpsc::unbounded_channel();
        let (poller_stop_tx, poller_stop_rx) = mpsc::channel(1);
        start_tree_poller(
            Arc::clone(&self.project_root),
            self.poll_interval,
            tree_tx,
            poller_stop_rx,
        );

        // Forward tree notifications to the frontend channel, sorted for a
        // stable listing.
        let events = self.events.clone();
        tokio::spawn(async move {
            while let Some(TreeEvent::Changed(snapshot)) = tree_rx.recv().await {
                let mut paths: Vec<String> = snapshot.into_iter().collect();
                paths.sort();
                if events.send(AppEvent::TreeChanged { paths }).is_err() {
                    return;
                }
            }
        });

        self.bridge = Some(bridge);
        self.sink = Some(sink);
        self.pump_stop = Some(pump_stop_tx);
        self.poller_stop = Some(poller_stop_tx);

        let _ = self.events.send(AppEvent::SessionStarted {
            root: path.display().to_string(),
        });

        self.activate_venv_if_present();
        Ok(())
    }

    /// Close the current folder: tear down the session, clear the root,
    /// close every tab, and point python back at the stock interpreter.
    pub fn close_folder(&mut self) -> Result<(), String> {
        self.teardown_session();

        if let Ok(mut root) = self.project_root.lock() {
            root.take();
        }
        self.tabs.close_all();
        self.debug.stop();

        // A venv interpreter dies with its project.
        let stock_python = Config::default().interpreter("python");
        self.config.set_interpreter("python", stock_python);
        self.save_config()?;

        let _ = self.events.send(AppEvent::SessionClosed);
        Ok(())
    }

    fn teardown_session(&mut self) {
        if let Some(stop) = self.poller_stop.take() {
            let _ = stop.try_send(());
        }
        if let Some(bridge) = self.bridge.take() {
            bridge.shutdown();
        }
        self.sink.take();
        if let Some(stop) = self.pump_stop.take() {
            let _ = stop.try_send(());
        }
        // Transcript truncation happens only here, on teardown.
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.clear();
        }
    }

    /// Create `venv` under the project root (if absent) and activate it.
    ///
    /// Creation runs the configured python synchronously; activation goes
    /// through the live shell like any other command.
    pub fn create_venv(&mut self) -> Result<(), String> {
        let root = self.require_root()?;

        if !root.join("venv").exists() {
            let python = glacier_config::resolve(&self.config, "python");
            let status = Command::new(&python)
                .args(["-m", "venv", "venv"])
                .current_dir(&root)
                .status()
                .map_err(|e| format!("Venv error: {e}"))?;
            if !status.success() {
                return Err(format!("Venv error: {python} -m venv exited with {status}"));
            }
        }

        self.activate_venv_if_present();
        Ok(())
    }

    fn activate_venv_if_present(&mut self) {
        let Some(root) = self.current_root() else {
            return;
        };
        let venv_python = venv_python_path(&root);
        if !venv_python.exists() {
            return;
        }

        self.config
            .set_interpreter("python", venv_python.to_string_lossy());
        if let Err(e) = self.save_config() {
            log::warn!("{e}");
        }

        let activate = if cfg!(windows) {
            r"venv\Scripts\activate.bat"
        } else {
            "source venv/bin/activate"
        };
        self.send_command(activate);
        self.report("Virtual environment activated.\n");
    }

    // ---- terminal ----

    /// Send a command string to the embedded shell.
    pub fn send_command(&self, command: &str) {
        match &self.bridge {
            Some(bridge) => bridge.send(command),
            None => log::warn!("no live session, dropping command: {command}"),
        }
    }

    /// Push a status line straight into the terminal output.
    fn report(&self, text: impl Into<String>) {
        if let Some(sink) = &self.sink {
            sink.push(text);
        }
    }

    /// The transcript shown in the terminal pane.
    pub fn terminal_output(&self) -> String {
        self.buffer
            .lock()
            .map(|buffer| buffer.contents().to_string())
            .unwrap_or_default()
    }

    pub fn is_session_alive(&self) -> bool {
        self.bridge.as_ref().is_some_and(|bridge| bridge.is_alive())
    }

    // ---- breakpoints & debugging ----

    /// Toggle a breakpoint on the current tab's file. Returns whether the
    /// breakpoint is set afterwards.
    pub fn toggle_breakpoint(&mut self, line: u32) -> Result<bool, String> {
        let path = self
            .tabs
            .current_path()
            .ok_or_else(|| "no tab selected".to_string())?;
        let set = self.breakpoints.toggle(&path, line);
        if set {
            self.report(format!("Breakpoint set at {}:{line}\n", path.display()));
        } else {
            self.report(format!("Breakpoint removed at {}:{line}\n", path.display()));
        }
        Ok(set)
    }

    pub fn breakpoints(&self) -> &BreakpointSet {
        &self.breakpoints
    }

    /// Launch the current tab's file under the external debugger.
    pub fn start_debug(&mut self) -> Result<(), String> {
        let path = self
            .tabs
            .current_path()
            .ok_or_else(|| "no tab selected".to_string())?;
        let bridge = self
            .bridge
            .clone()
            .ok_or_else(|| "no live session".to_string())?;

        let python = glacier_config::resolve(&self.config, "python");
        if let Err(msg) = self.debug.start(bridge.as_ref(), &python, &path) {
            self.report(format!("{msg}\n"));
        }
        Ok(())
    }

    pub fn step_over(&self) {
        if let Some(bridge) = &self.bridge {
            self.debug.step_over(bridge.as_ref());
        }
    }

    pub fn step_into(&self) {
        if let Some(bridge) = &self.bridge {
            self.debug.step_into(bridge.as_ref());
        }
    }

    pub fn step_out(&self) {
        if let Some(bridge) = &self.bridge {
            self.debug.step_out(bridge.as_ref());
        }
    }

    pub fn continue_execution(&self) {
        if let Some(bridge) = &self.bridge {
            self.debug.continue_execution(bridge.as_ref());
        }
    }

    pub fn inspect_variables(&self) {
        if let Some(bridge) = &self.bridge {
            self.debug.inspect_variables(bridge.as_ref());
        }
    }

    pub fn show_call_stack(&self) {
        if let Some(bridge) = &self.bridge {
            self.debug.show_call_stack(bridge.as_ref());
        }
    }

    pub fn stop_debug(&mut self) {
        self.debug.stop();
        self.report("Debugging session stopped\n");
    }

    // ---- running code ----

    /// Save and run the current tab.
    ///
    /// `.pseudo` files go through AI translation and the translated file is
    /// run instead; a leading `ai.fix()` line routes the buffer through the
    /// fix transform first and rewrites tab + file. All failures along the
    /// way surface as lines in the terminal output.
    pub fn run_current_tab(&mut self, transform: &dyn TextTransform) -> Result<(), String> {
        let (id, path, content) = {
            let (id, tab) = self
                .tabs
                .current()
                .ok_or_else(|| "no tab selected".to_string())?;
            (id, tab.path.clone(), tab.buffer.clone())
        };
        self.tabs.save_tab(id)?;

        if path.extension().and_then(|ext| ext.to_str()) == Some(PSEUDO_EXTENSION) {
            self.report("Processing pseudo-language file with AI...\n");
            match translate::translate_file(transform, &path, &content) {
                Ok((out_path, language)) => {
                    self.report(format!(
                        "Translated to {language}. Saved as: {}\n",
                        out_path.display()
                    ));
                    let interpreter = glacier_config::resolve(&self.config, &language);
                    match runner::run_commands(&out_path, &interpreter) {
                        Some(commands) => {
                            for command in commands {
                                self.send_command(&command);
                            }
                        }
                        None => self.report(format!(
                            "No runner for translated language: {language}\n"
                        )),
                    }
                }
                Err(msg) => self.report(format!("{msg}\n")),
            }
            return Ok(());
        }

        if content.lines().next().map(str::trim) == Some("ai.fix()") {
            self.report("AI debugging and fixing code...\n");
            match translate::fix_source(transform, &content) {
                Ok(fixed) => {
                    self.tabs.update_buffer(id, fixed)?;
                    self.tabs.save_tab(id)?;
                    self.report("Code fixed successfully!\n");
                }
                Err(msg) => {
                    self.report(format!("{msg}\n"));
                    return Ok(());
                }
            }
        }

        let language = detect_language(&path);
        let interpreter = glacier_config::resolve(&self.config, language);
        match runner::run_commands(&path, &interpreter) {
            Some(commands) => {
                for command in commands {
                    self.send_command(&command);
                }
            }
            None => {
                let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
                self.report(format!("Unsupported file type: .{ext}\n"));
            }
        }
        Ok(())
    }

    // ---- explorer operations ----

    /// Delete a file or directory shown in the explorer.
    ///
    /// The next poll notices the removal; nothing is signalled eagerly.
    pub fn delete_path(&mut self, path: &Path) -> Result<(), String> {
        // Tabs hold canonicalized paths; resolve before the entry is gone.
        let target = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let result = if path.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        result.map_err(|e| format!("Delete error: {e}"))?;

        // Drop any tab that was editing the deleted path.
        let stale: Vec<_> = self
            .tabs
            .list()
            .into_iter()
            .filter(|(_, tab_path)| tab_path.starts_with(&target))
            .map(|(id, _)| id)
            .collect();
        for id in stale {
            self.tabs.close_tab(id);
        }
        Ok(())
    }

    // ---- accessors ----

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Persist the configuration to its path, if one is set.
    pub fn save_config(&self) -> Result<(), String> {
        match &self.config_path {
            Some(path) => self
                .config
                .save(path)
                .map_err(|e| format!("failed to save config: {e}")),
            None => Ok(()),
        }
    }

    pub fn tabs(&self) -> &TabManager {
        &self.tabs
    }

    pub fn tabs_mut(&mut self) -> &mut TabManager {
        &mut self.tabs
    }

    pub fn project_root(&self) -> Option<PathBuf> {
        self.current_root()
    }

    fn current_root(&self) -> Option<PathBuf> {
        self.project_root.lock().ok().and_then(|root| root.clone())
    }

    fn require_root(&self) -> Result<PathBuf, String> {
        self.current_root()
            .ok_or_else(|| "Please open a folder first".to_string())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.teardown_session();
    }
}

/// Where a project venv keeps its python binary.
fn venv_python_path(root: &Path) -> PathBuf {
    if cfg!(windows) {
        root.join("venv").join("Scripts").join("python.exe")
    } else {
        root.join("venv").join("bin").join("python")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    struct CannedTransform(&'static str);

    impl TextTransform for CannedTransform {
        fn transform(&self, _instruction: &str, _input: &str) -> Result<String, String> {
            Ok(self.0.to_string())
        }
    }

    async fn wait_for_output(workspace: &Workspace, needle: &str) -> String {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let output = workspace.terminal_output();
            if output.contains(needle) {
                return output;
            }
            if Instant::now() > deadline {
                panic!("timed out waiting for {needle:?}; transcript so far: {output}");
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    fn fresh_workspace() -> (Workspace, mpsc::UnboundedReceiver<AppEvent>) {
        Workspace::new(Config::default(), None)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_open_folder_spawns_live_session() {
        let dir = tempfile::tempdir().unwrap();
        let (mut workspace, _events) = fresh_workspace();

        workspace.open_folder(dir.path()).unwrap();
        wait_for_output(&workspace, "Terminal started in:").await;
        assert!(workspace.is_session_alive());

        workspace.send_command("echo hi");
        // "\nhi\n" only matches the process-produced line; the echoed
        // command never starts a line with "hi".
        let output = wait_for_output(&workspace, "\nhi\n").await;
        assert!(output.contains("> echo hi\n"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_reopen_replaces_session_and_truncates_transcript() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        let (mut workspace, _events) = fresh_workspace();

        workspace.open_folder(dir_a.path()).unwrap();
        workspace.send_command("echo FIRST_SESSION");
        wait_for_output(&workspace, "FIRST_SESSION").await;

        workspace.open_folder(dir_b.path()).unwrap();
        let output = wait_for_output(&workspace, "Terminal started in:").await;
        assert!(
            !output.contains("FIRST_SESSION"),
            "old transcript leaked into new session: {output}"
        );
        assert!(workspace.is_session_alive());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_close_folder_resets_everything() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "x").unwrap();

        let (mut workspace, _events) = fresh_workspace();
        workspace.open_folder(dir.path()).unwrap();
        wait_for_output(&workspace, "Terminal started in:").await;
        workspace.tabs_mut().open_file(&file).unwrap();

        workspace.close_folder().unwrap();
        assert!(workspace.project_root().is_none());
        assert!(workspace.tabs().is_empty());
        assert!(!workspace.is_session_alive());
        assert_eq!(workspace.terminal_output(), "");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_venv_is_activated_on_open() {
        if cfg!(windows) {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("venv").join("bin");
        fs::create_dir_all(&bin).unwrap();
        fs::write(bin.join("python"), "").unwrap();

        let (mut workspace, _events) = fresh_workspace();
        workspace.open_folder(dir.path()).unwrap();

        let output = wait_for_output(&workspace, "Virtual environment activated.").await;
        assert!(output.contains("> source venv/bin/activate\n"));
        assert!(workspace
            .config()
            .interpreter("python")
            .ends_with("venv/bin/python"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_toggle_breakpoint_reports_to_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("main.py");
        fs::write(&file, "print()\n").unwrap();

        let (mut workspace, _events) = fresh_workspace();
        workspace.open_folder(dir.path()).unwrap();
        wait_for_output(&workspace, "Terminal started in:").await;
        workspace.tabs_mut().open_file(&file).unwrap();

        assert!(workspace.toggle_breakpoint(3).unwrap());
        wait_for_output(&workspace, "Breakpoint set at").await;
        assert_eq!(workspace.breakpoints().len(), 1);

        assert!(!workspace.toggle_breakpoint(3).unwrap());
        wait_for_output(&workspace, "Breakpoint removed at").await;
        assert!(workspace.breakpoints().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_run_pseudo_file_writes_translation() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("demo.pseudo");
        fs::write(&source, "<python>\nsay hi\n").unwrap();

        let (mut workspace, _events) = fresh_workspace();
        workspace.open_folder(dir.path()).unwrap();
        wait_for_output(&workspace, "Terminal started in:").await;
        workspace.tabs_mut().open_file(&source).unwrap();

        let transform = CannedTransform("print('hi')");
        workspace.run_current_tab(&transform).unwrap();

        wait_for_output(&workspace, "Translated to python. Saved as:").await;
        let translated = dir.path().join("demo.py");
        assert_eq!(fs::read_to_string(&translated).unwrap(), "print('hi')");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_ai_fix_rewrites_buffer_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("broken.py");
        fs::write(&source, "ai.fix()\nprin('hi')\n").unwrap();

        let (mut workspace, _events) = fresh_workspace();
        workspace.open_folder(dir.path()).unwrap();
        wait_for_output(&workspace, "Terminal started in:").await;
        let id = workspace.tabs_mut().open_file(&source).unwrap();

        let transform = CannedTransform("print('hi')");
        workspace.run_current_tab(&transform).unwrap();

        wait_for_output(&workspace, "Code fixed successfully!").await;
        assert_eq!(workspace.tabs().get(id).unwrap().buffer, "print('hi')");
        assert_eq!(fs::read_to_string(&source).unwrap(), "print('hi')\n");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_run_unsupported_extension_reports() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.zig");
        fs::write(&file, "").unwrap();

        let (mut workspace, _events) = fresh_workspace();
        workspace.open_folder(dir.path()).unwrap();
        wait_for_output(&workspace, "Terminal started in:").await;
        workspace.tabs_mut().open_file(&file).unwrap();

        let transform = CannedTransform("");
        workspace.run_current_tab(&transform).unwrap();
        wait_for_output(&workspace, "Unsupported file type: .zig").await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_delete_path_closes_stale_tabs() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        let file = sub.join("a.txt");
        fs::write(&file, "x").unwrap();

        let (mut workspace, _events) = fresh_workspace();
        workspace.open_folder(dir.path()).unwrap();
        wait_for_output(&workspace, "Terminal started in:").await;
        workspace.tabs_mut().open_file(&file).unwrap();

        workspace.delete_path(&sub).unwrap();
        assert!(!sub.exists());
        assert!(workspace.tabs().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_create_venv_requires_open_folder() {
        let (mut workspace, _events) = fresh_workspace();
        assert!(workspace.create_venv().is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_tree_changes_reach_event_channel() {
        let dir = tempfile::tempdir().unwrap();
        let (mut workspace, mut events) = fresh_workspace();
        workspace.set_poll_interval(Duration::from_millis(50));

        workspace.open_folder(dir.path()).unwrap();
        wait_for_output(&workspace, "Terminal started in:").await;

        fs::write(dir.path().join("new.txt"), "").unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                panic!("no TreeChanged event arrived");
            }
            let event = tokio::time::timeout(remaining, events.recv())
                .await
                .expect("no TreeChanged event arrived")
                .expect("event channel closed");
            if let AppEvent::TreeChanged { paths } = event {
                assert!(paths.contains(&"new.txt".to_string()));
                break;
            }
        }
    }
}
