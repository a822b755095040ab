use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crossbeam_utils::CachePadded;

/// Per-group counters. All fields are atomic to allow for lock-free updates.
#[derive(Debug)]
pub(crate) struct Stats {
  // --- Requests ---
  pub(crate) gets: CachePadded<AtomicU64>,
  pub(crate) cache_hits: CachePadded<AtomicU64>,

  // --- Coalesced loads ---
  pub(crate) loads: CachePadded<AtomicU64>,
  pub(crate) loads_deduped: CachePadded<AtomicU64>,

  // --- Origin of loaded values ---
  pub(crate) peer_loads: CachePadded<AtomicU64>,
  pub(crate) peer_errors: CachePadded<AtomicU64>,
  pub(crate) local_loads: CachePadded<AtomicU64>,
  pub(crate) local_load_errs: CachePadded<AtomicU64>,

  created_at: Instant,
}

impl Default for Stats {
  fn default() -> Self {
    Self {
      gets: CachePadded::new(AtomicU64::new(0)),
      cache_hits: CachePadded::new(AtomicU64::new(0)),
      loads: CachePadded::new(AtomicU64::new(0)),
      loads_deduped: CachePadded::new(AtomicU64::new(0)),
      peer_loads: CachePadded::new(AtomicU64::new(0)),
      peer_errors: CachePadded::new(AtomicU64::new(0)),
      local_loads: CachePadded::new(AtomicU64::new(0)),
      local_load_errs: CachePadded::new(AtomicU64::new(0)),
      created_at: Instant::now(),
    }
  }
}

impl Stats {
  #[inline]
  pub(crate) fn incr(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
  }

  /// Creates a point-in-time snapshot of the counters.
  pub(crate) fn snapshot(&self) -> StatsSnapshot {
    let gets = self.gets.load(Ordering::Relaxed);
    let cache_hits = self.cache_hits.load(Ordering::Relaxed);

    StatsSnapshot {
      gets,
      cache_hits,
      hit_ratio: if gets == 0 {
        0.0
      } else {
        cache_hits as f64 / gets as f64
      },
      loads: self.loads.load(Ordering::Relaxed),
      loads_deduped: self.loads_deduped.load(Ordering::Relaxed),
      peer_loads: self.peer_loads.load(Ordering::Relaxed),
      peer_errors: self.peer_errors.load(Ordering::Relaxed),
      local_loads: self.local_loads.load(Ordering::Relaxed),
      local_load_errs: self.local_load_errs.load(Ordering::Relaxed),
      uptime_secs: self.created_at.elapsed().as_secs(),
    }
  }
}

/// A point-in-time, public-facing snapshot of a group's counters.
#[derive(Clone, PartialEq)]
pub struct StatsSnapshot {
  /// Every call to `Group::get` with a non-empty key.
  pub gets: u64,
  /// Gets served straight from the local cache.
  pub cache_hits: u64,
  /// `cache_hits / gets`.
  pub hit_ratio: f64,
  /// Gets that missed the local cache and entered the coalescer. A load that
  /// finds the value on its second look at the cache counts here only.
  pub loads: u64,
  /// Loads that shared another caller's in-flight result.
  pub loads_deduped: u64,
  /// Values fetched successfully from a remote peer.
  pub peer_loads: u64,
  /// Remote fetches that failed and fell back to the getter.
  pub peer_errors: u64,
  /// Values loaded successfully from the getter.
  pub local_loads: u64,
  /// Getter failures.
  pub local_load_errs: u64,
  pub uptime_secs: u64,
}

impl fmt::Debug for StatsSnapshot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("StatsSnapshot")
      .field("gets", &self.gets)
      .field("cache_hits", &self.cache_hits)
      .field("hit_ratio", &format!("{:.2}%", self.hit_ratio * 100.0))
      .field("loads", &self.loads)
      .field("loads_deduped", &self.loads_deduped)
      .field("peer_loads", &self.peer_loads)
      .field("peer_errors", &self.peer_errors)
      .field("local_loads", &self.local_loads)
      .field("local_load_errs", &self.local_load_errs)
      .field("uptime_secs", &self.uptime_secs)
      .finish()
  }
}

/// Residency of a group's local cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
  pub entries: usize,
  pub used_bytes: u64,
  pub max_bytes: u64,
}
