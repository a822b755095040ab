use std::fmt;

use crate::ByteView;

/// Describes the reason an entry left the local cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
  /// The entry was removed to bring the cache back under its byte budget.
  Capacity,
  /// The entry was overwritten by a newer value for the same key.
  Replaced,
}

impl fmt::Display for EvictionReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EvictionReason::Capacity => write!(f, "evicted due to capacity"),
      EvictionReason::Replaced => write!(f, "replaced by a newer value"),
    }
  }
}

/// A listener that can be attached to a group's local cache to observe
/// entries leaving it.
///
/// `on_evict` runs on the thread that triggered the eviction, after the cache
/// lock has been released and the load that caused it has completed, so it
/// may call back into the group, including for the evicted key.
pub trait EvictionListener: Send + Sync {
  fn on_evict(&self, key: String, value: ByteView, reason: EvictionReason);
}

impl<F> EvictionListener for F
where
  F: Fn(String, ByteView, EvictionReason) + Send + Sync,
{
  fn on_evict(&self, key: String, value: ByteView, reason: EvictionReason) {
    self(key, value, reason)
  }
}
