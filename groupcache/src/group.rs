use crate::error::{GroupError, Result};
use crate::flight::FlightGroup;
use crate::getter::Getter;
use crate::local::LocalCache;
use crate::lru::Evicted;
use crate::peers::{PeerGetter, PeerPicker, Request};
use crate::stats::{CacheStats, Stats, StatsSnapshot};
use crate::ByteView;

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

/// A named cache namespace and the sources its values are loaded from.
///
/// A group serves keys from its local cache. On a miss, concurrent callers
/// for the same key are coalesced into one load, which asks the owning peer
/// first (if peers are registered) and falls back to the group's getter.
/// Only getter results are stored in the local cache.
pub struct Group {
  name: String,
  getter: Arc<dyn Getter>,
  main_cache: LocalCache,
  peers: OnceCell<Arc<dyn PeerPicker>>,
  loader: FlightGroup<Result<ByteView>>,
  stats: Stats,
}

impl fmt::Debug for Group {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Group")
      .field("name", &self.name)
      .field("main_cache", &self.main_cache)
      .field("has_peers", &self.peers.get().is_some())
      .field("stats", &self.stats.snapshot())
      .finish_non_exhaustive()
  }
}

impl Group {
  pub(crate) fn new(name: String, getter: Arc<dyn Getter>, main_cache: LocalCache) -> Self {
    Self {
      name,
      getter,
      main_cache,
      peers: OnceCell::new(),
      loader: FlightGroup::new(|key: &str| {
        Err(GroupError::Panicked {
          key: key.to_owned(),
        })
      }),
      stats: Stats::default(),
    }
  }

  #[inline]
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Attaches the peer picker used to find a key's owner.
  ///
  /// A group accepts exactly one picker; a second call is a wiring bug and
  /// returns `GroupError::PeersAlreadyRegistered`.
  pub fn register_peers<P>(&self, peers: P) -> Result<()>
  where
    P: PeerPicker + 'static,
  {
    self.register_peers_arc(Arc::new(peers))
  }

  /// Like `register_peers`, for a picker shared with other groups.
  pub fn register_peers_arc(&self, peers: Arc<dyn PeerPicker>) -> Result<()> {
    self
      .peers
      .set(peers)
      .map_err(|_| GroupError::PeersAlreadyRegistered {
        group: self.name.clone(),
      })?;
    tracing::debug!(group = %self.name, "peer picker registered");
    Ok(())
  }

  /// Returns the value for `key`.
  ///
  /// A local cache hit returns immediately. Otherwise this blocks until the
  /// coalesced load for `key` completes, and every caller waiting on that
  /// load receives the same value or the same error.
  pub fn get(&self, key: &str) -> Result<ByteView> {
    if key.is_empty() {
      return Err(GroupError::EmptyKey);
    }

    Stats::incr(&self.stats.gets);
    if let Some(value) = self.main_cache.get(key) {
      Stats::incr(&self.stats.cache_hits);
      tracing::debug!(group = %self.name, key, "cache hit");
      return Ok(value);
    }

    self.load(key)
  }

  /// A snapshot of this group's request counters.
  pub fn stats(&self) -> StatsSnapshot {
    self.stats.snapshot()
  }

  /// Current residency of the local cache.
  pub fn cache_stats(&self) -> CacheStats {
    let (entries, used_bytes) = self.main_cache.usage();
    CacheStats {
      entries,
      used_bytes,
      max_bytes: self.main_cache.max_bytes(),
    }
  }

  fn load(&self, key: &str) -> Result<ByteView> {
    Stats::incr(&self.stats.loads);

    // Filled by the leader only. Listeners run after the call closes so they
    // can re-enter the group for the key that was just loaded.
    let mut evicted = Vec::new();

    // Each key is fetched once, locally or remotely, regardless of the
    // number of concurrent callers.
    let flight = self.loader.call(key, || {
      // A previous load may have populated the cache between our miss and
      // the start of this call.
      if let Some(value) = self.main_cache.get(key) {
        return Ok(value);
      }

      if let Some(peer) = self.peers.get().and_then(|peers| peers.pick_peer(key)) {
        match self.get_from_peer(peer.as_ref(), key) {
          Ok(value) => {
            Stats::incr(&self.stats.peer_loads);
            tracing::debug!(group = %self.name, key, bytes = value.len(), "loaded from peer");
            return Ok(value);
          }
          Err(err) => {
            Stats::incr(&self.stats.peer_errors);
            tracing::warn!(group = %self.name, key, error = %err, "failed to get from peer");
          }
        }
      }

      let (value, removed) = self.get_locally(key)?;
      evicted = removed;
      Ok(value)
    });

    self.main_cache.notify(evicted);

    if flight.shared {
      Stats::incr(&self.stats.loads_deduped);
    }
    flight.value
  }

  // Peer values are not cached locally; the owner already holds them.
  fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteView> {
    let request = Request {
      group: self.name.clone(),
      key: key.to_owned(),
    };
    let response = peer
      .get(&request)
      .map_err(|source| GroupError::load(key, source))?;
    Ok(ByteView::from(response.value))
  }

  fn get_locally(&self, key: &str) -> Result<(ByteView, Vec<Evicted>)> {
    let bytes = match self.getter.get(key) {
      Ok(bytes) => bytes,
      Err(source) => {
        Stats::incr(&self.stats.local_load_errs);
        tracing::debug!(group = %self.name, key, error = %source, "getter failed");
        return Err(GroupError::load(key, source));
      }
    };
    Stats::incr(&self.stats.local_loads);

    // The getter handed over its buffer, so the view is the sole owner.
    let value = ByteView::from(bytes);
    tracing::debug!(group = %self.name, key, bytes = value.len(), "loaded from getter");
    let evicted = self.populate_cache(key, value.clone());
    Ok((value, evicted))
  }

  fn populate_cache(&self, key: &str, value: ByteView) -> Vec<Evicted> {
    self.main_cache.add(key, value)
  }
}
