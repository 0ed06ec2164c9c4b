//! Editor tabs: the mapping from open tabs to file paths and buffers.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Unique identifier for an editor tab.
pub type TabId = u64;

/// One open file: its path, in-memory buffer, and whether the buffer has
/// unsaved edits.
pub struct Tab {
    pub path: PathBuf,
    pub buffer: String,
    pub dirty: bool,
}

/// Open tabs, their buffers, and the current selection.
#[derive(Default)]
pub struct TabManager {
    tabs: HashMap<TabId, Tab>,
    order: Vec<TabId>,
    current: Option<TabId>,
    next_id: TabId,
}

impl TabManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a file in a tab and select it.
    ///
    /// Opening a path that's already open selects the existing tab instead
    /// of adding a duplicate; paths are compared canonicalized so relative
    /// and absolute spellings of the same file collapse.
    pub fn open_file(&mut self, path: &Path) -> Result<TabId, String> {
        let abs = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        if let Some(id) = self.find_by_path(&abs) {
            self.current = Some(id);
            return Ok(id);
        }

        let buffer = fs::read_to_string(&abs).map_err(|e| format!("Open file error: {e}"))?;

        self.next_id += 1;
        let id = self.next_id;
        self.tabs.insert(
            id,
            Tab {
                path: abs,
                buffer,
                dirty: false,
            },
        );
        self.order.push(id);
        self.current = Some(id);
        Ok(id)
    }

    /// Create an empty file on disk and open it.
    pub fn new_file(&mut self, path: &Path) -> Result<TabId, String> {
        fs::write(path, "").map_err(|e| format!("Create file error: {e}"))?;
        self.open_file(path)
    }

    fn find_by_path(&self, abs: &Path) -> Option<TabId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.tabs.get(id).is_some_and(|tab| tab.path == abs))
    }

    /// Replace a tab's buffer (frontend edits, AI rewrites).
    pub fn update_buffer(&mut self, id: TabId, content: impl Into<String>) -> Result<(), String> {
        let tab = self
            .tabs
            .get_mut(&id)
            .ok_or_else(|| format!("no such tab: {id}"))?;
        tab.buffer = content.into();
        tab.dirty = true;
        Ok(())
    }

    /// Write a tab's buffer to its file, normalizing the trailing newline.
    pub fn save_tab(&mut self, id: TabId) -> Result<(), String> {
        let tab = self
            .tabs
            .get_mut(&id)
            .ok_or_else(|| format!("no such tab: {id}"))?;
        let content = format!("{}\n", tab.buffer.trim_end());
        fs::write(&tab.path, content).map_err(|e| format!("Save error: {e}"))?;
        tab.dirty = false;
        Ok(())
    }

    /// Save the selected tab.
    pub fn save_current(&mut self) -> Result<(), String> {
        let id = self.current.ok_or_else(|| "no tab selected".to_string())?;
        self.save_tab(id)
    }

    pub fn close_tab(&mut self, id: TabId) {
        self.tabs.remove(&id);
        self.order.retain(|other| *other != id);
        if self.current == Some(id) {
            self.current = self.order.last().copied();
        }
    }

    pub fn close_all(&mut self) {
        self.tabs.clear();
        self.order.clear();
        self.current = None;
    }

    pub fn select(&mut self, id: TabId) -> Result<(), String> {
        if !self.tabs.contains_key(&id) {
            return Err(format!("no such tab: {id}"));
        }
        self.current = Some(id);
        Ok(())
    }

    pub fn current(&self) -> Option<(TabId, &Tab)> {
        let id = self.current?;
        self.tabs.get(&id).map(|tab| (id, tab))
    }

    pub fn current_path(&self) -> Option<PathBuf> {
        self.current().map(|(_, tab)| tab.path.clone())
    }

    pub fn get(&self, id: TabId) -> Option<&Tab> {
        self.tabs.get(&id)
    }

    /// Open tabs in opening order.
    pub fn list(&self) -> Vec<(TabId, PathBuf)> {
        self.order
            .iter()
            .filter_map(|id| self.tabs.get(id).map(|tab| (*id, tab.path.clone())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Language key for a file, by extension. `"unknown"` when unmapped.
pub fn detect_language(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "py" => "python",
        "js" => "javascript",
        "java" => "java",
        "cpp" | "cc" => "cpp",
        "c" => "c",
        "rs" => "rust",
        "go" => "go",
        "rb" => "ruby",
        "php" => "php",
        "lua" => "lua",
        "html" => "html",
        "css" => "css",
        "pseudo" => "pseudo",
        _ => "unknown",
    }
}
