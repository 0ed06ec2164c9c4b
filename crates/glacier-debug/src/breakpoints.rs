use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// The set of user-placed breakpoints, keyed by file and 1-based line.
///
/// Pure set membership; nothing here talks to the debugger. Order carries
/// no meaning, so listing sorts only for stable display.
#[derive(Debug, Default)]
pub struct BreakpointSet {
    points: HashSet<(PathBuf, u32)>,
}

impl BreakpointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle the breakpoint at `file:line`.
    ///
    /// Removes it if present, inserts it otherwise. Returns `true` when the
    /// breakpoint is set after the call.
    pub fn toggle(&mut self, file: &Path, line: u32) -> bool {
        let key = (file.to_path_buf(), line);
        if self.points.remove(&key) {
            false
        } else {
            self.points.insert(key);
            true
        }
    }

    pub fn contains(&self, file: &Path, line: u32) -> bool {
        self.points.contains(&(file.to_path_buf(), line))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All breakpoints, sorted for display.
    pub fn list(&self) -> Vec<(PathBuf, u32)> {
        let mut all: Vec<_> = self.points.iter().cloned().collect();
        all.sort();
        all
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_sets_then_clears() {
        let mut set = BreakpointSet::new();
        let file = Path::new("src/main.py");

        assert!(set.toggle(file, 10));
        assert!(set.contains(file, 10));
        assert_eq!(set.len(), 1);

        assert!(!set.toggle(file, 10));
        assert!(!set.contains(file, 10));
        assert!(set.is_empty());
    }

    #[test]
    fn test_double_toggle_restores_original_membership() {
        let mut set = BreakpointSet::new();
        let file = Path::new("a.py");
        set.toggle(file, 1);

        let before = set.list();
        set.toggle(file, 7);
        set.toggle(file, 7);
        assert_eq!(set.list(), before);
    }

    #[test]
    fn test_same_line_different_files_are_distinct() {
        let mut set = BreakpointSet::new();
        set.toggle(Path::new("a.py"), 3);
        set.toggle(Path::new("b.py"), 3);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_list_is_sorted() {
        let mut set = BreakpointSet::new();
        set.toggle(Path::new("b.py"), 2);
        set.toggle(Path::new("a.py"), 9);
        set.toggle(Path::new("a.py"), 1);

        let listed = set.list();
        assert_eq!(
            listed,
            vec![
                (PathBuf::from("a.py"), 1),
                (PathBuf::from("a.py"), 9),
                (PathBuf::from("b.py"), 2),
            ]
        );
    }
}
