//! Workbook watching for automatic data reload.
//!
//! Watches the workbook's parent directory (more reliable than the
//! file itself across editor save-and-replace and sync tools) and
//! fires the reload callback once events for the file go quiet.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Configuration for workbook watching and reload.
#[derive(Debug, Clone)]
pub struct ReloadConfig {
    /// Quiet period required after the last event before reloading.
    pub debounce: Duration,
    /// Number of reload attempts for transient failures.
    pub retry_attempts: u32,
    /// Delay between reload attempts.
    pub retry_delay: Duration,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_secs(2),
            retry_attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Errors that can occur while watching the workbook.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to create watcher: {0}")]
    Notify(#[from] notify::Error),

    #[error("watch path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("watch channel closed unexpectedly")]
    ChannelClosed,
}

/// Returns true if the event touches the watched file.
fn concerns_file(event: &Event, file_name: &OsString) -> bool {
    event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(file_name.as_os_str()))
}

/// Returns true for event kinds that can change file contents.
fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// Sleeps until the deadline, or forever when none is armed.
async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Watches the workbook and calls `on_change` after each burst of
/// modifications settles.
///
/// Blocks until an error occurs or the watcher is dropped.
pub async fn watch_workbook<F>(
    path: impl AsRef<Path>,
    config: ReloadConfig,
    on_change: F,
) -> Result<(), WatchError>
where
    F: Fn() + Send + Sync + 'static,
{
    let path = path.as_ref();

    let canonical_path = path
        .canonicalize()
        .map_err(|_| WatchError::PathNotFound(path.to_path_buf()))?;
    let watch_dir = canonical_path.parent().unwrap_or(&canonical_path);
    let file_name = canonical_path
        .file_name()
        .map(|s| s.to_owned())
        .ok_or_else(|| WatchError::PathNotFound(path.to_path_buf()))?;

    log::info!("Watching workbook: {}", canonical_path.display());
    log::debug!("Watch directory: {}", watch_dir.display());

    let (tx, mut rx) = mpsc::channel::<Event>(100);

    let mut watcher = RecommendedWatcher::new(
        move |result: Result<Event, notify::Error>| {
            if let Ok(event) = result {
                // Non-blocking send; a full channel just drops the event
                let _ = tx.try_send(event);
            }
        },
        notify::Config::default(),
    )?;

    watcher.watch(watch_dir, RecursiveMode::NonRecursive)?;

    // Trailing-edge debounce: every relevant event pushes the firing
    // deadline out; the callback runs once events go quiet.
    let mut deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            received = rx.recv() => {
                match received {
                    Some(event) if concerns_file(&event, &file_name) && is_relevant(&event) => {
                        log::debug!("Workbook event: {:?}", event.kind);
                        deadline = Some(Instant::now() + config.debounce);
                    }
                    Some(_) => {}
                    None => return Err(WatchError::ChannelClosed),
                }
            }
            _ = wait_for(deadline), if deadline.is_some() => {
                deadline = None;
                log::info!("Workbook changed, triggering reload");
                on_change();
            }
        }
    }
}
