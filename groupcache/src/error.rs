use std::sync::Arc;

use thiserror::Error;

/// A boxed, thread-safe error returned by getters and peer transports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur when building a `Group`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
  /// No authoritative getter was configured. A group cannot serve misses
  /// without one.
  #[error("a group requires a getter")]
  MissingGetter,
  /// The group name was empty.
  #[error("group name cannot be empty")]
  EmptyName,
}

/// Errors surfaced by `Group::get` and `Group::register_peers`.
///
/// The type is `Clone` because a single coalesced load fans its result out to
/// every caller waiting on the same key.
#[derive(Debug, Clone, Error)]
pub enum GroupError {
  #[error("key is required")]
  EmptyKey,

  /// The getter (or a peer) failed. Displays the source error unchanged;
  /// the key is kept for callers that want it.
  #[error("{source}")]
  Load {
    key: String,
    #[source]
    source: Arc<dyn std::error::Error + Send + Sync>,
  },

  #[error("peers already registered for group '{group}'")]
  PeersAlreadyRegistered { group: String },

  #[error("load for key '{key}' panicked")]
  Panicked { key: String },
}

impl GroupError {
  pub(crate) fn load(key: &str, source: BoxError) -> Self {
    GroupError::Load {
      key: key.to_owned(),
      source: Arc::from(source),
    }
  }

  /// Returns `true` if this error came from the authoritative getter.
  pub fn is_load(&self) -> bool {
    matches!(self, GroupError::Load { .. })
  }
}

/// A specialized `Result` type for group operations.
pub type Result<T, E = GroupError> = std::result::Result<T, E>;
