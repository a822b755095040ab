//! Capabilities for reaching the peer that owns a key.
//!
//! The mapping from key to owner and the transport behind a `PeerGetter` are
//! supplied by the caller; the group only needs these two narrow traits.

use crate::error::BoxError;

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A fetch request sent to a remote peer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Request {
  pub group: String,
  pub key: String,
}

/// The value a remote peer returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Response {
  pub value: Vec<u8>,
}

/// A handle capable of fetching a value from one remote peer.
pub trait PeerGetter: Send + Sync {
  fn get(&self, request: &Request) -> Result<Response, BoxError>;
}

/// Picks the peer that owns a key.
pub trait PeerPicker: Send + Sync {
  /// Returns the owning peer, or `None` when the local node should serve
  /// the key itself.
  fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

/// A picker for single-node deployments: every key is served locally.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPeers;

impl PeerPicker for NoPeers {
  fn pick_peer(&self, _key: &str) -> Option<Arc<dyn PeerGetter>> {
    None
  }
}
