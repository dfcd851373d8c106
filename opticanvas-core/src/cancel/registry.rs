use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Opaque identifier of one render request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RequestId(u64);

impl RequestId {
    /// Wrap a caller-supplied identifier.
    pub fn from_u64(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Marker returned by a stage that noticed its request was superseded.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
#[error("aborted: superseded by a newer request")]
pub struct Aborted;

/// Something a long-running stage can poll to learn whether it should stop.
pub trait CancelCheck {
    /// `true` once the work is no longer wanted.
    fn is_cancelled(&self) -> bool;

    /// `Err(Aborted)` once the work is no longer wanted.
    fn check(&self) -> Result<(), Aborted> {
        if self.is_cancelled() {
            Err(Aborted)
        } else {
            Ok(())
        }
    }
}

impl<F: Fn() -> bool> CancelCheck for F {
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// A check that never fires, for standalone use of the raster stages.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverCancel;

impl CancelCheck for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Process-wide map from task key to the most recently issued request id.
///
/// Entries are overwritten, never removed: the map grows to the number of distinct task keys and
/// stays there for the life of the process.
#[derive(Debug)]
pub struct RequestRegistry {
    latest: Mutex<HashMap<String, RequestId>>,
    next_id: AtomicU64,
}

impl Default for RequestRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestRegistry {
    /// Empty registry; every key starts idle.
    pub fn new() -> Self {
        Self {
            latest: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Record `id` as the newest request for `task_key`. Last write wins.
    pub fn register(&self, task_key: &str, id: RequestId) {
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        match latest.get_mut(task_key) {
            Some(slot) => *slot = id,
            None => {
                latest.insert(task_key.to_owned(), id);
            }
        }
    }

    /// Mint a fresh id and register it for `task_key` in one step.
    pub fn issue(&self, task_key: &str) -> RequestId {
        let id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.register(task_key, id);
        id
    }

    /// Newest registered id for `task_key`, if any request was ever seen.
    pub fn latest(&self, task_key: &str) -> Option<RequestId> {
        let latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        latest.get(task_key).copied()
    }

    /// Whether `id` is still the newest request for `task_key`.
    pub fn is_latest(&self, task_key: &str, id: RequestId) -> bool {
        self.latest(task_key) == Some(id)
    }

    /// Number of task keys ever registered.
    pub fn task_count(&self) -> usize {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Per-request view of the registry: "has someone newer arrived for my key?"
#[derive(Clone, Debug)]
pub struct CancellationToken {
    registry: Arc<RequestRegistry>,
    task_key: String,
    request_id: RequestId,
}

impl CancellationToken {
    /// Token for `request_id` under `task_key`. Does not register anything.
    pub fn new(
        registry: Arc<RequestRegistry>,
        task_key: impl Into<String>,
        request_id: RequestId,
    ) -> Self {
        Self {
            registry,
            task_key: task_key.into(),
            request_id,
        }
    }

    /// Task key this token watches.
    pub fn task_key(&self) -> &str {
        &self.task_key
    }

    /// Request this token belongs to.
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }
}

impl CancelCheck for CancellationToken {
    fn is_cancelled(&self) -> bool {
        !self.registry.is_latest(&self.task_key, self.request_id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cancel/registry.rs"]
mod tests;
