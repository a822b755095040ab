use fibre_groupcache::{BoxError, Registry};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use tracing_subscriber::EnvFilter;

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
    .init();

  let db: Arc<HashMap<&'static str, &'static str>> =
    Arc::new([("Tom", "630"), ("Jack", "589"), ("Sam", "567")].into_iter().collect());

  let registry = Registry::new();
  registry
    .new_group("scores", 2 << 10, {
      let db = db.clone();
      move |key: &str| -> Result<Vec<u8>, BoxError> {
        println!("[SlowDB] search key {key}");
        match db.get(key) {
          Some(value) => Ok(value.as_bytes().to_vec()),
          None => Err(format!("{key} not exist").into()),
        }
      }
    })
    .expect("Failed to build group");

  let scores = registry.get_group("scores").expect("group was just registered");

  // Several threads miss on the same keys at once; each key is loaded once.
  let handles: Vec<_> = (0..4)
    .map(|i| {
      let scores = scores.clone();
      thread::spawn(move || {
        for key in ["Tom", "Jack", "Sam", "Unknown"] {
          match scores.get(key) {
            Ok(value) => println!("[thread {i}] {key} = {value}"),
            Err(err) => println!("[thread {i}] {key}: {err}"),
          }
        }
      })
    })
    .collect();

  for handle in handles {
    handle.join().unwrap();
  }

  println!("\nGroup stats: {:#?}", scores.stats());
  println!("Cache usage: {:#?}", scores.cache_stats());
}
