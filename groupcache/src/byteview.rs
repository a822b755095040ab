use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// An immutable view over a cached byte payload.
///
/// The payload is shared between clones of the view, but no accessor ever
/// hands out a mutable reference to it. `to_vec` returns an independent copy
/// that the caller is free to modify.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ByteView {
  bytes: Arc<[u8]>,
}

impl ByteView {
  /// Creates a view holding a private copy of `bytes`.
  pub fn copy_from(bytes: &[u8]) -> Self {
    Self {
      bytes: Arc::from(bytes),
    }
  }

  /// The number of bytes in the payload.
  #[inline]
  pub fn len(&self) -> usize {
    self.bytes.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.bytes.is_empty()
  }

  /// Returns a fresh copy of the payload.
  pub fn to_vec(&self) -> Vec<u8> {
    self.bytes.to_vec()
  }

  /// Borrows the payload read-only.
  #[inline]
  pub fn as_bytes(&self) -> &[u8] {
    &self.bytes
  }

  /// The payload interpreted as UTF-8 text. Invalid sequences are replaced.
  pub fn as_text(&self) -> Cow<'_, str> {
    String::from_utf8_lossy(&self.bytes)
  }
}

impl From<&[u8]> for ByteView {
  fn from(bytes: &[u8]) -> Self {
    Self::copy_from(bytes)
  }
}

impl From<&str> for ByteView {
  fn from(text: &str) -> Self {
    Self::copy_from(text.as_bytes())
  }
}

// The vector is moved in, so no other owner can observe the buffer.
impl From<Vec<u8>> for ByteView {
  fn from(bytes: Vec<u8>) -> Self {
    Self {
      bytes: Arc::from(bytes),
    }
  }
}

impl AsRef<[u8]> for ByteView {
  fn as_ref(&self) -> &[u8] {
    &self.bytes
  }
}

impl fmt::Display for ByteView {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.as_text())
  }
}

impl fmt::Debug for ByteView {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ByteView")
      .field("len", &self.len())
      .field("text", &self.as_text())
      .finish()
  }
}
