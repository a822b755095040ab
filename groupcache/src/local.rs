use crate::listener::EvictionListener;
use crate::lru::{Evicted, LruStore};
use crate::ByteView;

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// A thread-safe, byte-budgeted LRU cache local to one group.
///
/// The underlying store is created on the first `add`. Until then, and
/// forever when the budget is zero, every lookup misses.
pub(crate) struct LocalCache {
  max_bytes: u64,
  inner: Mutex<Option<LruStore>>,
  listener: Option<Arc<dyn EvictionListener>>,
}

impl fmt::Debug for LocalCache {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LocalCache")
      .field("max_bytes", &self.max_bytes)
      .field("has_listener", &self.listener.is_some())
      .finish_non_exhaustive()
  }
}

impl LocalCache {
  pub(crate) fn new(max_bytes: u64, listener: Option<Arc<dyn EvictionListener>>) -> Self {
    Self {
      max_bytes,
      inner: Mutex::new(None),
      listener,
    }
  }

  /// Inserts `key` and returns the entries pushed out by it. The caller
  /// hands them to `notify` once it holds no locks of its own.
  pub(crate) fn add(&self, key: &str, value: ByteView) -> Vec<Evicted> {
    if self.max_bytes == 0 {
      return Vec::new();
    }

    let mut guard = self.inner.lock();
    guard
      .get_or_insert_with(|| LruStore::new(self.max_bytes))
      .add(key.to_owned(), value)
  }

  pub(crate) fn get(&self, key: &str) -> Option<ByteView> {
    let mut guard = self.inner.lock();
    guard.as_mut()?.get(key)
  }

  /// Returns `(entries, used_bytes)`.
  pub(crate) fn usage(&self) -> (usize, u64) {
    let guard = self.inner.lock();
    guard
      .as_ref()
      .map_or((0, 0), |store| (store.len(), store.used_bytes()))
  }

  #[inline]
  pub(crate) fn max_bytes(&self) -> u64 {
    self.max_bytes
  }

  pub(crate) fn notify(&self, evicted: Vec<Evicted>) {
    for (key, value, reason) in evicted {
      tracing::trace!(key = %key, bytes = value.len(), %reason, "local cache entry removed");
      if let Some(listener) = &self.listener {
        listener.on_evict(key, value, reason);
      }
    }
  }
}
