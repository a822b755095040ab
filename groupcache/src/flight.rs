//! Per-key request coalescing.
//!
//! A `FlightGroup` collapses concurrent calls for the same key into a single
//! execution of the producer. The first caller (the leader) runs the producer
//! on its own thread, every other caller parks until the leader completes and
//! then receives a clone of the same result.

use ahash::{HashMap, HashMapExt};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, Thread};

/// The internal state of an in-flight call.
enum State<T> {
  Computing,
  Complete(T),
}

struct Inner<T> {
  state: State<T>,
  waiters: VecDeque<Thread>,
}

/// A call that one thread is computing and any number of threads may wait on.
struct Call<T> {
  inner: Mutex<Inner<T>>,
}

impl<T: Clone> Call<T> {
  fn new() -> Self {
    Self {
      inner: Mutex::new(Inner {
        state: State::Computing,
        waiters: VecDeque::new(),
      }),
    }
  }

  /// Completes the call with a value, waking all waiters.
  fn complete(&self, value: T) {
    let mut inner = self.inner.lock();
    inner.state = State::Complete(value);
    for waiter in inner.waiters.drain(..) {
      waiter.unpark();
    }
  }

  /// Parks the current thread until the call completes.
  fn wait(&self) -> T {
    loop {
      {
        let mut inner = self.inner.lock();
        match &inner.state {
          State::Complete(value) => return value.clone(),
          State::Computing => inner.waiters.push_back(thread::current()),
        }
      }
      // Spurious wakeups re-check the state and re-register.
      thread::park();
    }
  }
}

/// The result of a coalesced call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flight<T> {
  pub value: T,
  /// `true` if this caller waited on another caller's producer.
  pub shared: bool,
}

/// Coalesces concurrent calls by key.
pub struct FlightGroup<T> {
  calls: Mutex<HashMap<String, Arc<Call<T>>>>,
  on_panic: Box<dyn Fn(&str) -> T + Send + Sync>,
}

impl<T> std::fmt::Debug for FlightGroup<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FlightGroup")
      .field("in_flight", &self.calls.lock().len())
      .finish()
  }
}

impl<T: Clone> FlightGroup<T> {
  /// Creates a group. `on_panic` builds the value handed to waiters when a
  /// producer panics; the panic itself resumes on the leader's thread.
  pub fn new<F>(on_panic: F) -> Self
  where
    F: Fn(&str) -> T + Send + Sync + 'static,
  {
    Self {
      calls: Mutex::new(HashMap::new()),
      on_panic: Box::new(on_panic),
    }
  }

  /// Runs `producer` for `key` unless a call for `key` is already in flight,
  /// in which case this blocks until that call completes and shares its result.
  pub fn call<F>(&self, key: &str, producer: F) -> Flight<T>
  where
    F: FnOnce() -> T,
  {
    let call = {
      let mut calls = self.calls.lock();
      if let Some(existing) = calls.get(key) {
        let existing = existing.clone();
        drop(calls);
        return Flight {
          value: existing.wait(),
          shared: true,
        };
      }
      let call = Arc::new(Call::new());
      calls.insert(key.to_owned(), call.clone());
      call
    };

    let outcome = panic::catch_unwind(AssertUnwindSafe(producer));

    // Close the epoch before publishing, so later misses start a new call.
    self.calls.lock().remove(key);

    match outcome {
      Ok(value) => {
        call.complete(value.clone());
        Flight {
          value,
          shared: false,
        }
      }
      Err(payload) => {
        call.complete((self.on_panic)(key));
        panic::resume_unwind(payload)
      }
    }
  }

  /// The number of keys with a call currently in flight.
  pub fn in_flight(&self) -> usize {
    self.calls.lock().len()
  }
}
