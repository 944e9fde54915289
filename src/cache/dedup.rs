//! Coalescing of concurrent identical requests
//!
//! Callers that ask for the same key while a request is in flight share its
//! result instead of starting another. The entry is removed as soon as the
//! request settles, so results are never cached here; pair with
//! [`TtlCache`](super::TtlCache) for that.

use futures::future::{BoxFuture, FutureExt, Shared};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;

/// Default time a shared request may take before every waiter gives up
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of distinct keys that may be in flight at once
pub const DEFAULT_CAPACITY: usize = 1000;

/// Failure seen by every waiter of a shared request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DedupError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("request failed: {0}")]
    Failed(String),
}

type SharedRequest<T> = Shared<BoxFuture<'static, Result<T, DedupError>>>;

struct Pending<T> {
    id: u64,
    request: SharedRequest<T>,
}

/// Snapshot of deduplicator activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DedupStats {
    /// Keys with a request in flight
    pub pending: usize,
    /// Requests actually started since creation
    pub total: u64,
}

/// Shares in-flight requests between callers asking for the same key
pub struct RequestDeduplicator<T> {
    pending: Mutex<IndexMap<String, Pending<T>>>,
    timeout: Duration,
    capacity: usize,
    next_id: AtomicU64,
}

impl<T> Default for RequestDeduplicator<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_CAPACITY)
    }
}

impl<T> RequestDeduplicator<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(timeout: Duration, capacity: usize) -> Self {
        Self {
            pending: Mutex::new(IndexMap::new()),
            timeout,
            capacity: capacity.max(1),
            next_id: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, IndexMap<String, Pending<T>>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `make()` for `key` unless a request for it is already in flight
    ///
    /// `make` is only called when this caller starts the request. Errors are
    /// turned into [`DedupError::Failed`] with the error's message, and every
    /// waiter receives the same outcome.
    pub async fn dedupe<F, Fut, E>(&self, key: &str, make: F) -> Result<T, DedupError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Display,
    {
        let (id, request) = {
            let mut pending = self.lock();
            match pending.get(key) {
                Some(entry) => {
                    tracing::trace!(key, "joining in-flight request");
                    (entry.id, entry.request.clone())
                }
                None => {
                    if pending.len() >= self.capacity {
                        let dropped = pending.len() / 2;
                        pending.drain(..dropped);
                        tracing::warn!(dropped, "too many pending requests, dropped the oldest");
                    }

                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let request = Self::wrap(key.to_string(), self.timeout, make());
                    pending.insert(
                        key.to_string(),
                        Pending {
                            id,
                            request: request.clone(),
                        },
                    );
                    (id, request)
                }
            }
        };

        let result = request.await;

        let mut pending = self.lock();
        if pending.get(key).is_some_and(|entry| entry.id == id) {
            pending.shift_remove(key);
        }
        result
    }

    fn wrap<Fut, E>(key: String, timeout: Duration, fut: Fut) -> SharedRequest<T>
    where
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Display,
    {
        async move {
            match tokio::time::timeout(timeout, fut).await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(DedupError::Failed(e.to_string())),
                Err(_) => {
                    tracing::warn!(key = %key, ?timeout, "shared request timed out");
                    Err(DedupError::Timeout(timeout))
                }
            }
        }
        .boxed()
        .shared()
    }

    pub fn stats(&self) -> DedupStats {
        DedupStats {
            pending: self.lock().len(),
            total: self.next_id.load(Ordering::Relaxed),
        }
    }

    /// Forget every in-flight request; current waiters still get their result
    pub fn clear(&self) {
        self.lock().clear();
    }
}
