//! Delayed loading and scroll listening on a shared table
//!
//! Hosts that render asynchronously share a [`TableState`] behind a tokio
//! mutex. A load started here holds the loading flag for the configured
//! delay so a loading indicator can be shown, then reveals the next rows.
//! If the data is replaced during the delay the load completes as a no-op.
//!
//! The completion runs on its own task, so dropping the caller or stopping a
//! watcher mid-delay never leaves the table stuck in the loading state.

use super::TableState;
use crate::core::record::Record;
use crate::pipeline::paginate::LoadTicket;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

/// Scroll position of the table's container, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// How far down the viewport bottom is, as a fraction of the content
    ///
    /// `None` when the content has no height.
    pub fn fraction(&self) -> Option<f64> {
        if !(self.scroll_height > 0.0) {
            return None;
        }
        Some((self.scroll_top + self.client_height) / self.scroll_height)
    }
}

/// A table shared between the render loop and background tasks
pub type SharedTableState<T> = Arc<Mutex<TableState<T>>>;

/// Wrap a table for sharing
pub fn shared<T>(state: TableState<T>) -> SharedTableState<T> {
    Arc::new(Mutex::new(state))
}

/// Complete `ticket` after `delay` on a detached task
fn spawn_completion<T>(state: SharedTableState<T>, ticket: LoadTicket, delay: Duration) -> JoinHandle<bool>
where
    T: Record + Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        state.lock().await.complete_load(ticket)
    })
}

/// Reveal more rows after `delay`
///
/// The lock is released while waiting. Returns true when rows were revealed,
/// false when there was nothing to load, a load was already running, or the
/// load was superseded by a data change. Dropping the returned future does not
/// cancel the load; it still completes after the delay.
pub async fn load_more_delayed<T>(state: &SharedTableState<T>, delay: Duration) -> bool
where
    T: Record + Clone + Send + Sync + 'static,
{
    let Some(ticket) = state.lock().await.load_more() else {
        return false;
    };
    match spawn_completion(state.clone(), ticket, delay).await {
        Ok(revealed) => revealed,
        Err(e) => {
            tracing::warn!(error = %e, "load completion task failed");
            state.lock().await.cancel_load(ticket);
            false
        }
    }
}

/// Background listener turning scroll events into delayed loads
///
/// The listener task lives as long as the watcher; dropping the watcher or
/// calling [`stop`](Self::stop) aborts it.
pub struct ScrollWatcher {
    tx: mpsc::Sender<ScrollMetrics>,
    handle: JoinHandle<()>,
}

impl ScrollWatcher {
    /// Spawn a listener for a shared table
    ///
    /// The delay between starting and completing a load is the table's
    /// `load_delay_ms`.
    pub fn spawn<T>(state: SharedTableState<T>) -> Self
    where
        T: Record + Clone + Send + Sync + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<ScrollMetrics>(64);

        let handle = tokio::spawn(async move {
            while let Some(metrics) = rx.recv().await {
                let (ticket, delay_ms) = {
                    let mut table = state.lock().await;
                    (table.on_scroll(metrics), table.config().load_delay_ms)
                };
                if let Some(ticket) = ticket {
                    // Outlives an abort of this listener
                    let completion =
                        spawn_completion(state.clone(), ticket, Duration::from_millis(delay_ms));
                    if completion.await.is_err() {
                        state.lock().await.cancel_load(ticket);
                    }
                }
            }
            tracing::debug!("scroll watcher stopped");
        });

        Self { tx, handle }
    }

    /// Forward a scroll event
    ///
    /// Returns false when the event was dropped because the listener is busy
    /// or gone. Scroll events are frequent, so dropping one is harmless.
    pub fn notify(&self, metrics: ScrollMetrics) -> bool {
        self.tx.try_send(metrics).is_ok()
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop listening
    ///
    /// A load already started still completes after its delay.
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for ScrollWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
