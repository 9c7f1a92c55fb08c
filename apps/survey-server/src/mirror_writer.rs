// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Mirror Writer
//!
//! Background task that owns the [`MirrorStore`] and applies mirror appends
//! off the request path. Submissions hand entries over through a bounded
//! channel and never wait on the file rewrite.
//!
//! ## Failure Policy
//!
//! The mirror is best-effort. A full queue, a closed channel, or a failed
//! write is logged and otherwise ignored; the record store remains the source
//! of truth.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken`. On cancellation the writer
//! stops accepting new entries, flushes whatever is already queued, and exits.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::storage::{MirrorEntry, MirrorStore};

/// Default number of entries that may wait for the writer.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// What happened to a mirror hand-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorOutcome {
    Queued,
    Dropped,
}

/// Cloneable sending side, held in application state.
#[derive(Clone)]
pub struct MirrorHandle {
    tx: mpsc::Sender<MirrorEntry>,
}

impl MirrorHandle {
    /// Hand an entry to the writer without waiting.
    pub fn enqueue(&self, entry: MirrorEntry) -> MirrorOutcome {
        match self.tx.try_send(entry) {
            Ok(()) => MirrorOutcome::Queued,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Mirror queue full, entry dropped");
                MirrorOutcome::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("Mirror writer stopped, entry dropped");
                MirrorOutcome::Dropped
            }
        }
    }
}

/// Receiving side; run it with [`MirrorWriter::run`].
pub struct MirrorWriter {
    store: Arc<MirrorStore>,
    rx: mpsc::Receiver<MirrorEntry>,
}

/// Create a connected handle/writer pair.
pub fn mirror_channel(store: Arc<MirrorStore>, capacity: usize) -> (MirrorHandle, MirrorWriter) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (MirrorHandle { tx }, MirrorWriter { store, rx })
}

impl MirrorWriter {
    /// Run until cancelled or until every handle is dropped.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(writer.run(shutdown.clone()));
    /// ```
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!("Mirror writer starting");

        loop {
            tokio::select! {
                received = self.rx.recv() => match received {
                    Some(entry) => self.write(entry).await,
                    None => {
                        info!("Mirror writer channel closed, exiting");
                        return;
                    }
                },
                _ = shutdown.cancelled() => {
                    let flushed = self.drain().await;
                    info!(flushed, "Mirror writer shutting down");
                    return;
                }
            }
        }
    }

    async fn drain(&mut self) -> usize {
        self.rx.close();
        let mut flushed = 0;
        while let Some(entry) = self.rx.recv().await {
            self.write(entry).await;
            flushed += 1;
        }
        flushed
    }

    async fn write(&self, entry: MirrorEntry) {
        let store = Arc::clone(&self.store);
        match tokio::task::spawn_blocking(move || store.append(entry)).await {
            Ok(Ok(total)) => debug!(total, "Mirror entry written"),
            Ok(Err(e)) => warn!(error = %e, "Mirror write failed"),
            Err(e) => warn!(error = %e, "Mirror write task failed"),
        }
    }
}
