//! Composition root: filesystem subscription, reconciliation and lifecycle.

use anyhow::{Context, Result, bail};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use log::{debug, error, info, warn};
use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::handler::VideoHandler;
use super::reconcile::Reconciler;
use crate::pipeline::Collaborators;
use crate::utils::config::{EVENT_CHANNEL_CAP, PackagePaths};
use crate::{HandlerOpts, Settings};

/// Paths an event makes appear in the directory, with their is-directory flag.
///
/// Creations count, and so do renames into place (copy tools often write a temp name and
/// rename at the end). Everything else is ignored.
pub fn arrivals(event: &Event) -> Vec<(PathBuf, bool)> {
    match event.kind {
        EventKind::Create(kind) => event
            .paths
            .iter()
            .map(|p| {
                let is_dir = match kind {
                    CreateKind::Folder => true,
                    CreateKind::File => false,
                    _ => p.is_dir(),
                };
                (p.clone(), is_dir)
            })
            .collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Both)) => event
            .paths
            .last()
            .map(|p| vec![(p.clone(), p.is_dir())])
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

struct Running {
    dir: PathBuf,
    watcher: RecommendedWatcher,
    forward: JoinHandle<()>,
    snapshot_stop: Sender<()>,
    snapshot: JoinHandle<()>,
}

/// Owns the handler, the watcher and the background threads for one watched directory.
pub struct MonitorCore {
    settings: Settings,
    handler: Arc<VideoHandler>,
    running: Option<Running>,
}

impl MonitorCore {
    pub fn new(settings: Settings, collab: Collaborators) -> Self {
        let handler = VideoHandler::new(HandlerOpts::from(&settings), collab);
        Self {
            settings,
            handler,
            running: None,
        }
    }

    pub fn handler(&self) -> &Arc<VideoHandler> {
        &self.handler
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Directory being watched (canonical), while running.
    pub fn watch_dir(&self) -> Option<&Path> {
        self.running.as_ref().map(|r| r.dir.as_path())
    }

    /// Start watching `dir` (non-recursive). Fails when `dir` is not an existing directory,
    /// the watcher cannot subscribe, or the snapshot database cannot be opened.
    pub fn start(&mut self, dir: &Path) -> Result<()> {
        if self.running.is_some() {
            bail!("monitor is already running");
        }
        if !dir.is_dir() {
            bail!(
                "watch directory {} does not exist or is not a directory",
                dir.display()
            );
        }
        let dir = dir
            .canonicalize()
            .with_context(|| format!("canonicalize {}", dir.display()))?;

        let (event_tx, event_rx) = bounded::<notify::Result<Event>>(EVENT_CHANNEL_CAP);
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = event_tx.send(res);
            },
            notify::Config::default(),
        )
        .context("create filesystem watcher")?;
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("watch {}", dir.display()))?;

        let forward = spawn_forwarder(event_rx, Arc::clone(&self.handler))?;

        let db_path = self
            .settings
            .snapshot_path
            .clone()
            .unwrap_or_else(|| dir.join(PackagePaths::get().snapshot_filename()));
        let mut reconciler = Reconciler::open(&dir, &db_path)?;
        if self.settings.reconcile {
            reconciler.reconcile(&self.handler)?;
        } else {
            reconciler.refresh()?;
        }

        let (snapshot_stop, stop_rx) = bounded::<()>(1);
        let snapshot =
            spawn_snapshot_refresher(reconciler, stop_rx, self.settings.snapshot_interval)?;

        info!("Watching {}", dir.display());
        self.running = Some(Running {
            dir,
            watcher,
            forward,
            snapshot_stop,
            snapshot,
        });
        Ok(())
    }

    /// Stop watching and wait for in-flight work. Armed timers still fire and their batches
    /// run to completion. Calling it again is a no-op.
    pub fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        info!("Stopping monitor for {}", running.dir.display());

        // Dropping the watcher drops the event sender, which ends the forwarder.
        drop(running.watcher);
        if running.forward.join().is_err() {
            error!("Event forwarding thread panicked");
        }

        self.handler.wait_idle();

        let _ = running.snapshot_stop.send(());
        if running.snapshot.join().is_err() {
            error!("Snapshot thread panicked");
        }
        debug!("Monitor stopped");
    }
}

impl Drop for MonitorCore {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_forwarder(
    rx: Receiver<notify::Result<Event>>,
    handler: Arc<VideoHandler>,
) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("event-forward".to_string())
        .spawn(move || {
            for res in rx.iter() {
                match res {
                    Ok(event) => {
                        for (path, is_dir) in arrivals(&event) {
                            handler.on_created(&path, is_dir);
                        }
                    }
                    Err(e) => warn!("Watcher error: {}", e),
                }
            }
            debug!("Event forwarding finished");
        })
        .context("spawn event forwarding thread")
}

/// Rewrites the snapshot every `interval`, and once more when told to stop.
fn spawn_snapshot_refresher(
    mut reconciler: Reconciler,
    stop_rx: Receiver<()>,
    interval: Duration,
) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("snapshot".to_string())
        .spawn(move || {
            loop {
                let stopping = match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => false,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
                };
                if let Err(e) = reconciler.refresh() {
                    warn!("Snapshot refresh failed: {:#}", e);
                }
                if stopping {
                    break;
                }
            }
        })
        .context("spawn snapshot thread")
}
