use card_error::Result;

/// Flat key-value persistence over string keys and opaque byte payloads.
///
/// Implementations are synchronous and durable on return: once `set`
/// comes back `Ok`, the payload survives the process. There is no
/// partial-write state to reason about at this level.
pub trait BasePrefs {
    /// Payload stored under `key`, if any.
    fn get(&self, key: &str) -> Option<&[u8]>;

    /// Create or replace the payload under `key`.
    fn set(&mut self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Drop the payload under `key`. Removing an absent key is a no-op.
    fn remove(&mut self, key: &str) -> Result<()>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}
