#![allow(dead_code)]

use fibre_groupcache::{BoxError, Getter, PeerGetter, PeerPicker, Request, Response};

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// The demo database used throughout the tests.
pub fn scores_db() -> HashMap<String, String> {
  [("Tom", "630"), ("Jack", "589"), ("Sam", "567")]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// A getter backed by a map that counts every call.
pub struct CountingGetter {
  db: HashMap<String, String>,
  delay: Option<Duration>,
  pub calls: Arc<AtomicUsize>,
}

impl CountingGetter {
  pub fn new(db: HashMap<String, String>) -> Self {
    Self {
      db,
      delay: None,
      calls: Arc::new(AtomicUsize::new(0)),
    }
  }

  /// Simulates a slow database call.
  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = Some(delay);
    self
  }

  pub fn counter(&self) -> Arc<AtomicUsize> {
    self.calls.clone()
  }
}

impl Getter for CountingGetter {
  fn get(&self, key: &str) -> Result<Vec<u8>, BoxError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if let Some(delay) = self.delay {
      thread::sleep(delay);
    }
    match self.db.get(key) {
      Some(value) => Ok(value.as_bytes().to_vec()),
      None => Err(format!("{key} not exist").into()),
    }
  }
}

/// A peer that either serves a fixed map or always fails.
pub struct FakePeer {
  values: HashMap<String, String>,
  fail: bool,
  delay: Option<Duration>,
  pub requests: Mutex<Vec<Request>>,
}

impl FakePeer {
  pub fn serving(values: HashMap<String, String>) -> Arc<Self> {
    Arc::new(Self {
      values,
      fail: false,
      delay: None,
      requests: Mutex::new(Vec::new()),
    })
  }

  pub fn serving_slowly(values: HashMap<String, String>, delay: Duration) -> Arc<Self> {
    Arc::new(Self {
      values,
      fail: false,
      delay: Some(delay),
      requests: Mutex::new(Vec::new()),
    })
  }

  pub fn unreachable() -> Arc<Self> {
    Arc::new(Self {
      values: HashMap::new(),
      fail: true,
      delay: None,
      requests: Mutex::new(Vec::new()),
    })
  }

  pub fn request_count(&self) -> usize {
    self.requests.lock().unwrap().len()
  }
}

impl PeerGetter for FakePeer {
  fn get(&self, request: &Request) -> Result<Response, BoxError> {
    self.requests.lock().unwrap().push(request.clone());
    if let Some(delay) = self.delay {
      thread::sleep(delay);
    }
    if self.fail {
      return Err("connection refused".into());
    }
    match self.values.get(&request.key) {
      Some(value) => Ok(Response {
        value: value.as_bytes().to_vec(),
      }),
      None => Err(format!("peer has no value for {}", request.key).into()),
    }
  }
}

/// A picker that routes every key to one peer, or serves every key locally.
pub struct FakePicker {
  peer: Option<Arc<FakePeer>>,
  pub picks: AtomicUsize,
}

impl FakePicker {
  pub fn remote(peer: Arc<FakePeer>) -> Self {
    Self {
      peer: Some(peer),
      picks: AtomicUsize::new(0),
    }
  }

  pub fn local() -> Self {
    Self {
      peer: None,
      picks: AtomicUsize::new(0),
    }
  }
}

impl PeerPicker for FakePicker {
  fn pick_peer(&self, _key: &str) -> Option<Arc<dyn PeerGetter>> {
    self.picks.fetch_add(1, Ordering::SeqCst);
    self
      .peer
      .clone()
      .map(|peer| peer as Arc<dyn PeerGetter>)
  }
}
