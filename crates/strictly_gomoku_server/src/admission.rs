//! Bounded admission queue for freshly accepted connections.
//!
//! The acceptor pushes with [`Admitter::try_admit`], which never waits: when
//! `capacity` connections are already pending the newcomer is handed back
//! for the caller to close. The dispatcher awaits [`PendingQueue::dequeue`],
//! which parks the task until a connection is available.

use std::fmt;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, instrument};

/// Returned by [`Admitter::try_admit`] when the queue is full or the
/// dispatcher has stopped. Carries the rejected item back to the caller.
pub struct AdmissionRejected<T>(pub T);

impl<T> AdmissionRejected<T> {
    /// Recovers the rejected item.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for AdmissionRejected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdmissionRejected").finish_non_exhaustive()
    }
}

impl<T> fmt::Display for AdmissionRejected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Admission queue is full")
    }
}

impl<T> std::error::Error for AdmissionRejected<T> {}

/// Producer half of the admission queue.
pub struct Admitter<T> {
    tx: mpsc::Sender<T>,
}

impl<T> Clone for Admitter<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

/// Consumer half of the admission queue.
pub struct PendingQueue<T> {
    rx: mpsc::Receiver<T>,
}

/// Creates an admission queue holding at most `capacity` pending items.
///
/// # Panics
///
/// Panics if `capacity` is zero; the server validates its config first.
#[instrument]
pub fn admission_queue<T>(capacity: usize) -> (Admitter<T>, PendingQueue<T>) {
    let (tx, rx) = mpsc::channel(capacity);
    (Admitter { tx }, PendingQueue { rx })
}

impl<T> Admitter<T> {
    /// Enqueues `item` unless `capacity` items are already pending.
    pub fn try_admit(&self, item: T) -> Result<(), AdmissionRejected<T>> {
        match self.tx.try_send(item) {
            Ok(()) => {
                debug!(pending = self.pending(), "Connection admitted");
                Ok(())
            }
            Err(TrySendError::Full(item)) | Err(TrySendError::Closed(item)) => {
                Err(AdmissionRejected(item))
            }
        }
    }

    /// Number of items waiting for the dispatcher.
    pub fn pending(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    /// Maximum number of pending items.
    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

impl<T> PendingQueue<T> {
    /// Waits for the next admitted item.
    ///
    /// Returns `None` once every [`Admitter`] is dropped and the queue is
    /// drained.
    pub async fn dequeue(&mut self) -> Option<T> {
        self.rx.recv().await
    }
}
