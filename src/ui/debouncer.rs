//! Search input debouncer.
//!
//! Coalesces rapid-fire search input into a single committed query after a
//! quiet period.
//!
//! ## Design
//!
//! Uses an mpsc channel + timeout loop:
//! 1. `schedule(query)` sends a non-blocking message
//! 2. Background task waits for the first value, then keeps consuming
//!    values until `delay` of silence, remembering only the latest
//! 3. After the quiet period, hands the latest value to `commit`
//! 4. `cancel()` drops the pending value; dropping the debouncer stops the
//!    task so `commit` never runs after its owner is gone
//!
//! ## Usage
//!
//! ```ignore
//! let debouncer = SearchDebouncer::new(Duration::from_millis(300), move |q| tx.send(q));
//! debouncer.schedule("mil");
//! debouncer.schedule("milk"); // only "milk" is committed
//! ```

use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default quiet period before a search is committed
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

enum Command {
    Schedule(String),
    Cancel,
}

/// Debounced search commit. Must be created inside a tokio runtime.
pub struct SearchDebouncer {
    tx: mpsc::UnboundedSender<Command>,
    shutdown: CancellationToken,
}

impl SearchDebouncer {
    /// Create a debouncer that calls `commit` after `delay` of silence.
    ///
    /// Spawns a background tokio task that lives until the debouncer is dropped.
    pub fn new<F>(delay: Duration, commit: F) -> Self
    where
        F: Fn(String) + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        tokio::spawn(Self::run_loop(rx, delay, commit, shutdown.clone()));
        Self { tx, shutdown }
    }

    /// Schedule `query` for commit, replacing any pending value and
    /// restarting the quiet period. Non-blocking.
    pub fn schedule(&self, query: impl Into<String>) {
        let _ = self.tx.send(Command::Schedule(query.into()));
    }

    /// Drop the pending value, if any, without committing it
    pub fn cancel(&self) {
        let _ = self.tx.send(Command::Cancel);
    }

    async fn run_loop<F>(
        mut rx: mpsc::UnboundedReceiver<Command>,
        delay: Duration,
        commit: F,
        shutdown: CancellationToken,
    ) where
        F: Fn(String) + Send + 'static,
    {
        'idle: loop {
            // Wait for the first value
            let mut latest = tokio::select! {
                _ = shutdown.cancelled() => return,
                cmd = rx.recv() => match cmd {
                    Some(Command::Schedule(query)) => query,
                    Some(Command::Cancel) => continue 'idle,
                    None => return, // debouncer dropped
                },
            };

            // Keep consuming until the quiet period elapses
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => return,
                    next = tokio::time::timeout(delay, rx.recv()) => match next {
                        Ok(Some(Command::Schedule(query))) => latest = query,
                        Ok(Some(Command::Cancel)) => {
                            debug!("Pending search cancelled");
                            continue 'idle;
                        }
                        Ok(None) => return,
                        Err(_) => break, // quiet period elapsed
                    },
                }
            }

            debug!(query = %latest, "Search committed");
            commit(latest);
        }
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
