use std::collections::HashSet;
use std::path::{Path, MAIN_SEPARATOR};

use walkdir::WalkDir;

/// Walk the whole tree under `root` and record every entry relative to it.
///
/// Regular files are recorded as-is; directories get a trailing path
/// separator so a file and a directory with the same name never collide in
/// the set. Entries the walk cannot read (permission denied, deleted while
/// walking) are skipped and the snapshot still completes. Iteration order
/// carries no meaning; snapshots are compared by set equality only.
pub fn snapshot(root: &Path) -> HashSet<String> {
    let mut paths = HashSet::new();

    for entry in WalkDir::new(root).min_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("skipping unreadable entry under {}: {e}", root.display());
                continue;
            }
        };

        let rel = match entry.path().strip_prefix(root) {
            Ok(rel) => rel,
            Err(_) => continue,
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            let mut name = rel.to_string_lossy().into_owned();
            name.push(MAIN_SEPARATOR);
            paths.insert(name);
        } else if file_type.is_file() {
            paths.insert(rel.to_string_lossy().into_owned());
        }
    }

    paths
}
