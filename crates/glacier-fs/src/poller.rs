use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::snapshot::snapshot;

/// How often the tree is re-walked unless the caller picks something else.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Notifications emitted by the tree poller.
#[derive(Debug, Clone)]
pub enum TreeEvent {
    /// The tree differs from the last stored snapshot; carries the new one.
    Changed(HashSet<String>),
}

/// Start the polling loop as a tokio task.
///
/// Each tick re-snapshots whatever `root` currently points at (the walk runs
/// under `spawn_blocking` so the timer task never blocks on I/O) and emits
/// [`TreeEvent::Changed`] iff the new set differs from the stored one. A
/// `None` root makes the tick a no-op that just waits for the next one.
///
/// The task ends when the stop channel fires or the event receiver is
/// dropped. Must be called from within a tokio runtime.
pub fn start_tree_poller(
    root: Arc<Mutex<Option<PathBuf>>>,
    interval: Duration,
    events: mpsc::UnboundedSender<TreeEvent>,
    mut stop_rx: mpsc::Receiver<()>,
) {
    tokio::spawn(async move {
        // Seed the stored set so a freshly opened folder doesn't signal a
        // change on the first tick.
        let mut last = match current_root(&root) {
            Some(dir) => walk_off_runtime(dir).await,
            None => HashSet::new(),
        };

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        ticker.tick().await; // the first tick is immediate; consume it

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = stop_rx.recv() => return,
            }

            let Some(dir) = current_root(&root) else {
                continue;
            };

            let current = walk_off_runtime(dir).await;
            if current != last {
                last = current.clone();
                if events.send(TreeEvent::Changed(current)).is_err() {
                    return;
                }
            }
        }
    });
}

fn current_root(root: &Arc<Mutex<Option<PathBuf>>>) -> Option<PathBuf> {
    root.lock().ok().and_then(|guard| guard.clone())
}

async fn walk_off_runtime(dir: PathBuf) -> HashSet<String> {
    match tokio::task::spawn_blocking(move || snapshot(&dir)).await {
        Ok(set) => set,
        Err(e) => {
            log::warn!("tree walk task failed: {e}");
            HashSet::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tokio::time::timeout;

    const TEST_INTERVAL: Duration = Duration::from_millis(50);
    const EVENT_WAIT: Duration = Duration::from_secs(2);

    #[tokio::test(flavor = "multi_thread")]
    async fn test_detects_added_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = Arc::new(Mutex::new(Some(dir.path().to_path_buf())));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (_stop_tx, stop_rx) = mpsc::channel(1);

        start_tree_poller(Arc::clone(&root), TEST_INTERVAL, tx, stop_rx);

        fs::write(dir.path().join("a.txt"), "").unwrap();

        let event = timeout(EVENT_WAIT, rx.recv()).await.expect("no event");
        let TreeEvent::Changed(snap) = event.expect("channel closed");
        assert!(snap.contains("a.txt"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_silent_when_tree_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();

        let root = Arc::new(Mutex::new(Some(dir.path().to_path_buf())));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (_stop_tx, stop_rx) = mpsc::channel(1);

        start_tree_poller(root, TEST_INTERVAL, tx, stop_rx);

        // Several poll intervals with no changes must produce no events.
        let waited = timeout(Duration::from_millis(300), rx.recv()).await;
        assert!(waited.is_err(), "poller signalled without a change");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_noop_without_root_then_picks_up_new_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();

        let root: Arc<Mutex<Option<PathBuf>>> = Arc::new(Mutex::new(None));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (_stop_tx, stop_rx) = mpsc::channel(1);

        start_tree_poller(Arc::clone(&root), TEST_INTERVAL, tx, stop_rx);

        // No root: polling is a no-op that keeps rescheduling.
        let waited = timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(waited.is_err(), "poller walked without a root");

        *root.lock().unwrap() = Some(dir.path().to_path_buf());

        let event = timeout(EVENT_WAIT, rx.recv()).await.expect("no event");
        let TreeEvent::Changed(snap) = event.expect("channel closed");
        assert!(snap.contains("a.txt"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_stop_channel_ends_polling() {
        let dir = tempfile::tempdir().unwrap();
        let root = Arc::new(Mutex::new(Some(dir.path().to_path_buf())));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = mpsc::channel(1);

        start_tree_poller(root, TEST_INTERVAL, tx, stop_rx);

        stop_tx.send(()).await.unwrap();
        // Give the stop a moment to land before mutating the tree.
        tokio::time::sleep(Duration::from_millis(100)).await;
        fs::write(dir.path().join("late.txt"), "").unwrap();

        let waited = timeout(Duration::from_millis(300), rx.recv()).await;
        match waited {
            Err(_) => {}
            Ok(None) => {} // task exited and dropped the sender
            Ok(Some(_)) => panic!("poller kept polling after stop"),
        }
    }
}
