//! File watching for config hot reload.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Quiet period before a batch of changes is reported.
const DEBOUNCE: Duration = Duration::from_millis(150);

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// The site description file was written, replaced or removed
    ConfigModified(PathBuf),

    /// A Markdown document was created, modified or deleted
    DocumentsChanged(PathBuf),
}

/// Watches the site description and the docs tree.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Create a new file watcher.
    ///
    /// The config file's directory is watched rather than the file itself so
    /// that editors replacing the file on save are still seen.
    pub fn new(
        config_path: &Path,
        docs_dir: &Path,
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        let config_dir = match config_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        watcher
            .watch(&config_dir, RecursiveMode::NonRecursive)
            .map_err(std::io::Error::other)?;

        if docs_dir.exists() {
            watcher
                .watch(docs_dir, RecursiveMode::Recursive)
                .map_err(std::io::Error::other)?;
        }

        let config_name = config_path.file_name().map(|n| n.to_os_string());

        std::thread::spawn(move || {
            while let Some(event) = next_batch(&sync_rx, DEBOUNCE, config_name.as_ref()) {
                if async_tx.blocking_send(event).is_err() {
                    return;
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Wait for a relevant change, then keep collecting until `quiet` passes
/// without events. Returns `None` once the watcher is gone.
///
/// A config change outranks document changes in the same batch.
fn next_batch(
    rx: &mpsc::Receiver<notify::Event>,
    quiet: Duration,
    config_name: Option<&OsString>,
) -> Option<WatchEvent> {
    let mut batch: Option<WatchEvent> = None;

    loop {
        let event = if batch.is_some() {
            match rx.recv_timeout(quiet) {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return batch,
            }
        } else {
            rx.recv().ok()?
        };

        for path in &event.paths {
            let Some(next) = classify_event(path, &event.kind, config_name) else {
                continue;
            };
            batch = match (batch, next) {
                (Some(config @ WatchEvent::ConfigModified(_)), WatchEvent::DocumentsChanged(_)) => {
                    Some(config)
                }
                (_, next) => Some(next),
            };
        }
    }
}

/// Classify a notify event into a WatchEvent.
fn classify_event(
    path: &Path,
    kind: &notify::EventKind,
    config_name: Option<&OsString>,
) -> Option<WatchEvent> {
    use notify::EventKind;

    if !matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return None;
    }

    if config_name.is_some_and(|name| path.file_name() == Some(name.as_os_str())) {
        return Some(WatchEvent::ConfigModified(path.to_path_buf()));
    }

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if ext == "md" || ext == "mdx" {
        Some(WatchEvent::DocumentsChanged(path.to_path_buf()))
    } else {
        None
    }
}
