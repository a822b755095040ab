use crate::error::BoxError;

/// The authoritative source a group loads from on a miss.
///
/// Implementations must be safe to call concurrently.
pub trait Getter: Send + Sync {
  fn get(&self, key: &str) -> Result<Vec<u8>, BoxError>;
}

impl<F> Getter for F
where
  F: Fn(&str) -> Result<Vec<u8>, BoxError> + Send + Sync,
{
  fn get(&self, key: &str) -> Result<Vec<u8>, BoxError> {
    self(key)
  }
}
