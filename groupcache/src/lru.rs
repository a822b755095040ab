use crate::listener::EvictionReason;
use crate::ByteView;

use ahash::{HashMap, HashMapExt};
use generational_arena::{Arena, Index};

#[derive(Debug)]
struct Node {
  key: String,
  value: ByteView,
  next: Option<Index>,
  prev: Option<Index>,
}

impl Node {
  #[inline]
  fn cost(&self) -> u64 {
    entry_cost(&self.key, &self.value)
  }
}

/// The number of bytes an entry is charged against the budget.
#[inline]
pub(crate) fn entry_cost(key: &str, value: &ByteView) -> u64 {
  (key.len() + value.len()) as u64
}

/// An entry pushed out of the store by `add`.
pub(crate) type Evicted = (String, ByteView, EvictionReason);

/// A byte-budgeted LRU store.
///
/// Not thread-safe on its own; `LocalCache` serializes access to it.
#[derive(Debug)]
pub(crate) struct LruStore {
  // Arena stores all nodes contiguously.
  nodes: Arena<Node>,
  lookup: HashMap<String, Index>,
  // Head is the most-recently-used item.
  head: Option<Index>,
  // Tail is the least-recently-used item.
  tail: Option<Index>,
  used_bytes: u64,
  max_bytes: u64,
}

impl LruStore {
  pub fn new(max_bytes: u64) -> Self {
    Self {
      nodes: Arena::new(),
      lookup: HashMap::new(),
      head: None,
      tail: None,
      used_bytes: 0,
      max_bytes,
    }
  }

  // Unlinks a node without removing it from the arena or the lookup map.
  fn unlink(&mut self, index: Index) {
    let node = &self.nodes[index];
    let prev_node_idx = node.prev;
    let next_node_idx = node.next;

    if let Some(prev_idx) = prev_node_idx {
      self.nodes[prev_idx].next = next_node_idx;
    } else {
      self.head = next_node_idx;
    }

    if let Some(next_idx) = next_node_idx {
      self.nodes[next_idx].prev = prev_node_idx;
    } else {
      self.tail = prev_node_idx;
    }
  }

  // Links a node that is already in the arena in as the new head.
  fn push_front_node(&mut self, index: Index) {
    let old_head_idx = self.head;
    self.nodes[index].next = old_head_idx;
    self.nodes[index].prev = None;
    self.head = Some(index);

    if let Some(old_head) = old_head_idx {
      self.nodes[old_head].prev = Some(index);
    }

    if self.tail.is_none() {
      self.tail = Some(index);
    }
  }

  fn move_to_front(&mut self, index: Index) {
    if self.head != Some(index) {
      self.unlink(index);
      self.push_front_node(index);
    }
  }

  /// Inserts or replaces `key`, marks it most recently used, then evicts from
  /// the tail until the store fits its budget again.
  ///
  /// Returns everything that left the store, in eviction order.
  pub fn add(&mut self, key: String, value: ByteView) -> Vec<Evicted> {
    let mut evicted = Vec::new();

    if let Some(&index) = self.lookup.get(&key) {
      let new_cost = entry_cost(&key, &value);
      let node = &mut self.nodes[index];
      let old_cost = node.cost();
      let old_value = std::mem::replace(&mut node.value, value);
      self.used_bytes = self.used_bytes.saturating_sub(old_cost) + new_cost;
      self.move_to_front(index);
      evicted.push((key, old_value, EvictionReason::Replaced));
    } else {
      let node = Node {
        key: key.clone(),
        value,
        next: None,
        prev: None,
      };
      self.used_bytes += node.cost();
      let index = self.nodes.insert(node);
      self.lookup.insert(key, index);
      self.push_front_node(index);
    }

    while self.used_bytes > self.max_bytes {
      match self.pop_back() {
        Some((key, value)) => evicted.push((key, value, EvictionReason::Capacity)),
        None => break,
      }
    }

    evicted
  }

  /// Looks up `key` and marks it most recently used.
  pub fn get(&mut self, key: &str) -> Option<ByteView> {
    let index = *self.lookup.get(key)?;
    self.move_to_front(index);
    Some(self.nodes[index].value.clone())
  }

  pub fn remove(&mut self, key: &str) -> Option<ByteView> {
    let index = self.lookup.remove(key)?;
    self.unlink(index);
    let node = self.nodes.remove(index)?;
    self.used_bytes = self.used_bytes.saturating_sub(node.cost());
    Some(node.value)
  }

  /// Removes the least recently used entry.
  pub fn pop_back(&mut self) -> Option<(String, ByteView)> {
    let tail_index = self.tail?;
    let key = self.nodes.get(tail_index)?.key.clone();
    let value = self.remove(&key)?;
    Some((key, value))
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.lookup.len()
  }

  #[inline]
  pub fn used_bytes(&self) -> u64 {
    self.used_bytes
  }

  #[cfg(test)]
  pub fn max_bytes(&self) -> u64 {
    self.max_bytes
  }

  // A helper for tests, to get the order of keys from head to tail.
  #[cfg(test)]
  pub(crate) fn keys_as_vec(&self) -> Vec<String> {
    let mut keys = Vec::new();
    let mut current = self.head;
    while let Some(index) = current {
      keys.push(self.nodes[index].key.clone());
      current = self.nodes[index].next;
    }
    keys
  }
}
