use crate::builder::GroupBuilder;
use crate::error::BuildError;
use crate::getter::Getter;
use crate::group::Group;

use std::sync::Arc;

use ahash::{HashMap, HashMapExt};
use once_cell::sync::Lazy;
use parking_lot::RwLock;

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

/// A name-to-group mapping.
///
/// Lookups take a shared lock and registrations an exclusive one. Groups are
/// never removed. Registering a name twice replaces the earlier group; callers
/// still holding the old `Arc<Group>` keep using it.
#[derive(Debug, Default)]
pub struct Registry {
  groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl Registry {
  pub fn new() -> Self {
    Self {
      groups: RwLock::new(HashMap::new()),
    }
  }

  /// The process-wide registry.
  pub fn global() -> &'static Registry {
    &GLOBAL
  }

  /// Builds and registers a group called `name` backed by `getter`.
  pub fn new_group<G>(&self, name: &str, max_bytes: u64, getter: G) -> Result<Arc<Group>, BuildError>
  where
    G: Getter + 'static,
  {
    self.register(GroupBuilder::new(name).max_bytes(max_bytes).getter(getter))
  }

  /// Builds the group described by `builder` and registers it.
  pub fn register(&self, builder: GroupBuilder) -> Result<Arc<Group>, BuildError> {
    let group = Arc::new(builder.build()?);
    self.insert(group.clone());
    Ok(group)
  }

  /// Registers an already built group under its name.
  pub fn insert(&self, group: Arc<Group>) {
    let name = group.name().to_owned();
    let replaced = self.groups.write().insert(name.clone(), group).is_some();
    if replaced {
      tracing::debug!(group = %name, "replaced existing group registration");
    } else {
      tracing::debug!(group = %name, "group registered");
    }
  }

  /// Returns the group registered as `name`, if any.
  pub fn get_group(&self, name: &str) -> Option<Arc<Group>> {
    self.groups.read().get(name).cloned()
  }

  /// Names of all registered groups, in no particular order.
  pub fn names(&self) -> Vec<String> {
    self.groups.read().keys().cloned().collect()
  }

  pub fn len(&self) -> usize {
    self.groups.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.groups.read().is_empty()
  }
}
