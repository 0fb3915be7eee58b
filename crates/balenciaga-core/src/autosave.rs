//! Debounced autosave timers.
//!
//! ## Learning: Cancellable Tasks
//!
//! Each edit (re)starts a timer for its document. A timer is a spawned tokio
//! task that sleeps and then reports the document ID over a channel. Keeping
//! the `JoinHandle` lets us `abort()` the timer when the user types again or
//! closes the tab.
//!
//! An aborted task may already have sent its message before the abort
//! landed. Every schedule therefore carries a generation number, and
//! messages from older generations are dropped on receipt.

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::document::DocumentId;

/// Default quiet period before an edited document is saved.
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(1000);

/// Per-document debounce timers.
#[derive(Debug)]
pub struct AutosaveScheduler {
    delay: Duration,
    next_generation: u64,
    pending: HashMap<DocumentId, (u64, JoinHandle<()>)>,
    tx: mpsc::UnboundedSender<(DocumentId, u64)>,
    rx: mpsc::UnboundedReceiver<(DocumentId, u64)>,
}

impl AutosaveScheduler {
    /// Creates a scheduler that fires `delay` after the last edit.
    pub fn new(delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            delay,
            next_generation: 0,
            pending: HashMap::new(),
            tx,
            rx,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Starts or restarts the timer for `id`.
    ///
    /// Without a tokio runtime there is nothing to run the timer on, so the
    /// call only logs.
    pub fn schedule(&mut self, id: DocumentId) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(document = %id, "no tokio runtime, autosave not scheduled");
            return;
        };

        self.cancel(id);

        self.next_generation += 1;
        let generation = self.next_generation;
        let tx = self.tx.clone();
        let delay = self.delay;

        let task = handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send((id, generation));
        });

        debug!(document = %id, generation, "autosave scheduled");
        self.pending.insert(id, (generation, task));
    }

    /// Stops the timer for `id`, if any.
    pub fn cancel(&mut self, id: DocumentId) {
        if let Some((_, task)) = self.pending.remove(&id) {
            task.abort();
        }
    }

    /// Returns true if a timer is running for `id`.
    pub fn is_pending(&self, id: DocumentId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Waits for the next timer to fire and returns its document.
    ///
    /// Returns `None` only if the channel closed, which cannot happen while
    /// the scheduler holds its own sender.
    pub async fn next_due(&mut self) -> Option<DocumentId> {
        loop {
            let (id, generation) = self.rx.recv().await?;
            if self.accept(id, generation) {
                return Some(id);
            }
        }
    }

    /// Returns a document whose timer already fired, without waiting.
    pub fn try_next_due(&mut self) -> Option<DocumentId> {
        while let Ok((id, generation)) = self.rx.try_recv() {
            if self.accept(id, generation) {
                return Some(id);
            }
        }
        None
    }

    fn accept(&mut self, id: DocumentId, generation: u64) -> bool {
        match self.pending.get(&id) {
            Some((current, _)) if *current == generation => {
                self.pending.remove(&id);
                true
            }
            _ => false,
        }
    }
}

impl Default for AutosaveScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_DELAY)
    }
}

impl Drop for AutosaveScheduler {
    fn drop(&mut self) {
        for (_, (_, task)) in self.pending.drain() {
            task.abort();
        }
    }
}
