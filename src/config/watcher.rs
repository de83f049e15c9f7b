//! Hot reload of the `[chaos]` section.
//!
//! The parent directory is watched rather than the file itself, so editors
//! that save by writing a new file and renaming it over the old one are
//! still picked up. Only events naming the config file trigger a reload.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::{ChaosSettings, ServiceKind};

/// Sends the chaos settings of every successful reload of one config file.
pub struct ConfigWatcher {
    kind: ServiceKind,
    path: PathBuf,
    chaos_tx: mpsc::UnboundedSender<ChaosSettings>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end for reloaded chaos settings.
    pub fn new(kind: ServiceKind, path: &Path) -> (Self, mpsc::UnboundedReceiver<ChaosSettings>) {
        let (chaos_tx, chaos_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            kind,
            path: path.to_path_buf(),
            chaos_tx,
        };
        (watcher, chaos_rx)
    }

    /// Start watching on notify's background thread.
    ///
    /// Events stop when the returned handle is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            kind,
            path,
            chaos_tx,
        } = self;

        let file_name = path.file_name().map(OsString::from).unwrap_or_default();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let reload_path = path.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if touches_file(&event, &file_name) => {
                if let Some(chaos) = reload_chaos(kind, &reload_path) {
                    let _ = chaos_tx.send(chaos);
                }
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Config watch error"),
        })?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::info!(path = %path.display(), "Watching config file for chaos changes");
        Ok(watcher)
    }
}

/// Whether `event` created or modified the file named `file_name`.
pub fn touches_file(event: &Event, file_name: &OsString) -> bool {
    (event.kind.is_modify() || event.kind.is_create())
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
}

/// Load and validate the whole file, keeping only its chaos settings.
///
/// A file that fails to load leaves the running configuration alone.
pub fn reload_chaos(kind: ServiceKind, path: &Path) -> Option<ChaosSettings> {
    match load_config(kind, Some(path)) {
        Ok(config) => Some(config.chaos),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Ignoring config change: {}", e);
            None
        }
    }
}
