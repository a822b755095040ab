//! A namespaced, distributed, read-through byte cache.
//!
//! Callers ask a named [`Group`] for a key. The group answers from its
//! byte-budgeted local LRU, or loads the value exactly once per concurrent
//! burst of misses: from the peer that owns the key when a [`PeerPicker`] is
//! registered, otherwise (or when the peer fails) from the group's [`Getter`].
//!
//! # Features
//! - **Single-flight loads**: concurrent misses for one key share one load.
//! - **Immutable values**: [`ByteView`] never exposes its buffer mutably.
//! - **Independent groups**: each group owns its cache and lock; a
//!   [`Registry`] maps names to groups.
//! - **Pluggable peers**: key ownership and transport are supplied by the
//!   caller through two single-method traits.
//!
//! ```
//! use fibre_groupcache::{BoxError, Registry};
//!
//! let registry = Registry::new();
//! let scores = registry
//!   .new_group("scores", 2 << 10, |key: &str| -> Result<Vec<u8>, BoxError> {
//!     match key {
//!       "Tom" => Ok(b"630".to_vec()),
//!       _ => Err(format!("{key} not exist").into()),
//!     }
//!   })
//!   .unwrap();
//!
//! assert_eq!(scores.get("Tom").unwrap().as_text(), "630");
//! assert!(scores.get("Unknown").is_err());
//! ```

pub mod builder;
pub mod error;
pub mod flight;
pub mod listener;
pub mod peers;
pub mod registry;

mod byteview;
mod getter;
mod group;
mod local;
mod lru;
mod stats;

pub use builder::{GroupBuilder, GroupConfig};
pub use byteview::ByteView;
pub use error::{BoxError, BuildError, GroupError, Result};
pub use getter::Getter;
pub use group::Group;
pub use listener::{EvictionListener, EvictionReason};
pub use peers::{NoPeers, PeerGetter, PeerPicker, Request, Response};
pub use registry::Registry;
pub use stats::{CacheStats, StatsSnapshot};
