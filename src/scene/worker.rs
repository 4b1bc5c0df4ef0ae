//! Background scene loading.
//!
//! A scene is built completely on the worker thread and handed back as a
//! value; the caller swaps it into its active slot. Nothing is shared while
//! the load runs. Requests carry an epoch so a caller can discard results
//! it no longer wants.

use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::util::Error;

use super::Scene;

/// Commands sent to the loader thread.
#[derive(Debug)]
pub enum LoadCommand {
    /// Load the archive at `path`.
    Load { path: PathBuf, epoch: u64 },
    /// Stop the loader thread.
    Stop,
}

/// Results sent back from the loader thread.
pub enum LoadResult {
    /// Scene is ready to swap in.
    Ready { scene: Box<Scene>, epoch: u64 },
    /// Load failed; the caller's previous scene stays active.
    Failed {
        path: PathBuf,
        error: Error,
        epoch: u64,
    },
}

/// Handle to the background loader thread.
///
/// Dropping the handle stops the thread and joins it.
pub struct LoaderHandle {
    tx: Sender<LoadCommand>,
    rx: Receiver<LoadResult>,
    handle: Option<JoinHandle<()>>,
}

impl LoaderHandle {
    /// Spawn the loader thread.
    pub fn spawn() -> Self {
        let (cmd_tx, cmd_rx) = channel::<LoadCommand>();
        let (res_tx, res_rx) = channel::<LoadResult>();

        let handle = thread::spawn(move || {
            loader_loop(cmd_rx, res_tx);
        });

        Self {
            tx: cmd_tx,
            rx: res_rx,
            handle: Some(handle),
        }
    }

    /// Queue a load request tagged with `epoch`.
    pub fn request(&self, path: impl Into<PathBuf>, epoch: u64) {
        let _ = self.tx.send(LoadCommand::Load {
            path: path.into(),
            epoch,
        });
    }

    /// Take one finished load, if any. Never blocks.
    pub fn try_recv(&self) -> Option<LoadResult> {
        self.rx.try_recv().ok()
    }

    /// Block until the next finished load, `None` once the thread is gone.
    pub fn recv(&self) -> Option<LoadResult> {
        self.rx.recv().ok()
    }

    /// Stop the loader and wait for it to finish.
    pub fn stop(&mut self) {
        let _ = self.tx.send(LoadCommand::Stop);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for LoaderHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn loader_loop(rx: Receiver<LoadCommand>, tx: Sender<LoadResult>) {
    loop {
        let cmd = match rx.recv() {
            Ok(cmd) => cmd,
            Err(_) => break,
        };
        match cmd {
            LoadCommand::Load { path, epoch } => {
                // Rapid consecutive requests: only the newest matters.
                let Some((path, epoch)) = drain_to_latest(&rx, path, epoch) else {
                    break;
                };
                debug!(path = %path.display(), epoch, "loading scene in background");
                let result = match Scene::load(&path) {
                    Ok(scene) => LoadResult::Ready {
                        scene: Box::new(scene),
                        epoch,
                    },
                    Err(error) => LoadResult::Failed { path, error, epoch },
                };
                if tx.send(result).is_err() {
                    break;
                }
            }
            LoadCommand::Stop => break,
        }
    }
}

/// Drain queued commands and keep only the newest load; `None` when a stop
/// arrived while draining.
fn drain_to_latest(
    rx: &Receiver<LoadCommand>,
    mut path: PathBuf,
    mut epoch: u64,
) -> Option<(PathBuf, u64)> {
    while let Ok(cmd) = rx.try_recv() {
        match cmd {
            LoadCommand::Load { path: p, epoch: e } => {
                path = p;
                epoch = e;
            }
            LoadCommand::Stop => return None,
        }
    }
    Some((path, epoch))
}
