use fibre_groupcache::{BoxError, ByteView, EvictionReason, Group, GroupBuilder};

use once_cell::sync::OnceCell;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex, Weak};
use std::thread;
use std::time::Duration;

// Every key is two bytes and every value eight, so each entry costs 10 bytes.
fn padded(key: &str) -> Result<Vec<u8>, BoxError> {
  Ok(format!("value-{key}").into_bytes()[..8].to_vec())
}

#[test]
fn test_budget_evicts_least_recently_used() {
  let evicted = Arc::new(Mutex::new(Vec::new()));
  let loads = Arc::new(AtomicUsize::new(0));

  let group = GroupBuilder::new("evict")
    .max_bytes(20)
    .getter({
      let loads = loads.clone();
      move |key: &str| {
        loads.fetch_add(1, Ordering::SeqCst);
        padded(key)
      }
    })
    .eviction_listener({
      let evicted = evicted.clone();
      move |key: String, _value: ByteView, reason: EvictionReason| {
        evicted.lock().unwrap().push((key, reason));
      }
    })
    .build()
    .unwrap();

  group.get("k0").unwrap();
  group.get("k1").unwrap();
  // Touch k0 so k1 becomes the least recently used entry.
  group.get("k0").unwrap();
  group.get("k2").unwrap();

  assert_eq!(
    evicted.lock().unwrap().clone(),
    vec![("k1".to_string(), EvictionReason::Capacity)]
  );
  let usage = group.cache_stats();
  assert_eq!(usage.entries, 2);
  assert_eq!(usage.used_bytes, 20);

  // k0 and k2 are resident, k1 must be loaded again.
  assert_eq!(loads.load(Ordering::SeqCst), 3);
  group.get("k0").unwrap();
  group.get("k2").unwrap();
  assert_eq!(loads.load(Ordering::SeqCst), 3);
  group.get("k1").unwrap();
  assert_eq!(loads.load(Ordering::SeqCst), 4);
}

#[test]
fn test_resident_size_never_exceeds_budget() {
  let group = GroupBuilder::new("evict")
    .max_bytes(55)
    .getter(padded)
    .build()
    .unwrap();

  for i in 0..100 {
    let key = format!("{:02}", i);
    group.get(&key).unwrap();
    let usage = group.cache_stats();
    assert!(usage.used_bytes <= usage.max_bytes, "{usage:?}");
  }
  assert_eq!(group.cache_stats().entries, 5);
}

#[test]
fn test_oversized_value_is_served_but_not_retained() {
  let group = GroupBuilder::new("evict")
    .max_bytes(8)
    .getter(|_key: &str| -> Result<Vec<u8>, BoxError> { Ok(vec![7u8; 64]) })
    .build()
    .unwrap();

  assert_eq!(group.get("big").unwrap().len(), 64);
  assert_eq!(group.cache_stats().entries, 0);
}

#[test]
fn test_listener_can_reenter_group_for_evicted_key() {
  let slot: Arc<OnceCell<Weak<Group>>> = Arc::new(OnceCell::new());
  let reentered = Arc::new(AtomicBool::new(false));
  let nested = Arc::new(Mutex::new(Vec::new()));
  let loads = Arc::new(AtomicUsize::new(0));

  let group = Arc::new(
    GroupBuilder::new("reenter")
      .max_bytes(4)
      .getter({
        let loads = loads.clone();
        move |_key: &str| -> Result<Vec<u8>, BoxError> {
          loads.fetch_add(1, Ordering::SeqCst);
          Ok(vec![1u8; 16])
        }
      })
      .eviction_listener({
        let slot = slot.clone();
        let reentered = reentered.clone();
        let nested = nested.clone();
        move |key: String, _value: ByteView, _reason: EvictionReason| {
          // Re-enter once; the nested load evicts the same key again.
          if reentered.swap(true, Ordering::SeqCst) {
            return;
          }
          if let Some(group) = slot.get().and_then(Weak::upgrade) {
            let result = group.get(&key).map(|value| value.len());
            nested.lock().unwrap().push(result);
          }
        }
      })
      .build()
      .unwrap(),
  );
  slot.set(Arc::downgrade(&group)).unwrap();

  let (done_tx, done_rx) = mpsc::channel();
  {
    let group = group.clone();
    thread::spawn(move || {
      let _ = done_tx.send(group.get("big").map(|value| value.len()));
    });
  }

  let outer = done_rx
    .recv_timeout(Duration::from_secs(3))
    .expect("get should return when the listener re-enters the group");
  assert!(matches!(outer, Ok(16)));

  let nested = nested.lock().unwrap();
  assert_eq!(nested.len(), 1);
  assert!(matches!(nested[0], Ok(16)));
  assert_eq!(loads.load(Ordering::SeqCst), 2);
  assert_eq!(group.cache_stats().entries, 0);
}
