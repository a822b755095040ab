use crate::error::BuildError;
use crate::getter::Getter;
use crate::group::Group;
use crate::listener::EvictionListener;
use crate::local::LocalCache;

use core::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Declarative settings for a group, e.g. loaded from a config file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroupConfig {
  pub name: String,
  /// Byte budget of the local cache. Zero disables local caching.
  #[cfg_attr(feature = "serde", serde(default))]
  pub max_bytes: u64,
}

/// A builder for creating `Group` instances.
pub struct GroupBuilder {
  pub(crate) name: String,
  pub(crate) max_bytes: u64,
  getter: Option<Arc<dyn Getter>>,
  listener: Option<Arc<dyn EvictionListener>>,
}

impl fmt::Debug for GroupBuilder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("GroupBuilder")
      .field("name", &self.name)
      .field("max_bytes", &self.max_bytes)
      .field("has_getter", &self.getter.is_some())
      .field("has_listener", &self.listener.is_some())
      .finish()
  }
}

impl GroupBuilder {
  /// Starts a builder for a group called `name` with local caching disabled.
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      max_bytes: 0,
      getter: None,
      listener: None,
    }
  }

  pub fn from_config(config: GroupConfig) -> Self {
    Self::new(config.name).max_bytes(config.max_bytes)
  }

  /// Sets the byte budget of the group's local cache.
  pub fn max_bytes(mut self, max_bytes: u64) -> Self {
    self.max_bytes = max_bytes;
    self
  }

  /// Sets the authoritative source for keys missing from every cache.
  pub fn getter<G>(mut self, getter: G) -> Self
  where
    G: Getter + 'static,
  {
    self.getter = Some(Arc::new(getter));
    self
  }

  /// Sets a getter shared with other groups.
  pub fn getter_arc(mut self, getter: Arc<dyn Getter>) -> Self {
    self.getter = Some(getter);
    self
  }

  /// Sets the listener notified when entries leave the local cache.
  pub fn eviction_listener<L>(mut self, listener: L) -> Self
  where
    L: EvictionListener + 'static,
  {
    self.listener = Some(Arc::new(listener));
    self
  }

  pub fn build(self) -> Result<Group, BuildError> {
    if self.name.is_empty() {
      return Err(BuildError::EmptyName);
    }
    let getter = self.getter.ok_or(BuildError::MissingGetter)?;
    let main_cache = LocalCache::new(self.max_bytes, self.listener);
    Ok(Group::new(self.name, getter, main_cache))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::BoxError;

  fn echo(key: &str) -> Result<Vec<u8>, BoxError> {
    Ok(key.as_bytes().to_vec())
  }

  #[test]
  fn missing_getter_is_rejected() {
    let err = GroupBuilder::new("scores").max_bytes(2048).build().unwrap_err();
    assert_eq!(err, BuildError::MissingGetter);
  }

  #[test]
  fn empty_name_is_rejected() {
    let err = GroupBuilder::new("").getter(echo).build().unwrap_err();
    assert_eq!(err, BuildError::EmptyName);
  }

  #[test]
  fn builds_with_configured_budget() {
    let group = GroupBuilder::new("scores").max_bytes(2048).getter(echo).build().unwrap();
    assert_eq!(group.name(), "scores");
    assert_eq!(group.cache_stats().max_bytes, 2048);
  }

  #[cfg(feature = "serde")]
  #[test]
  fn config_defaults_budget_to_zero() {
    let config: GroupConfig = serde_json::from_str(r#"{ "name": "scores" }"#).unwrap();
    assert_eq!(config.max_bytes, 0);

    let group = GroupBuilder::from_config(config).getter(echo).build().unwrap();
    assert_eq!(group.cache_stats().max_bytes, 0);
  }
}
