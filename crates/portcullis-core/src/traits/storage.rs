//! Key/value storage trait backing the token store and the CSRF cookie.

use crate::result::AppResult;

/// Persistent string key/value storage, the client-side analogue of
/// browser `localStorage`.
///
/// Implementations must be internally synchronized. Writes from several
/// processes sharing one backend are last-write-wins; no cross-process
/// locking is attempted.
pub trait KeyValueStorage: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value. Returns `None` if the key is absent.
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> AppResult<()>;

    /// All keys currently stored, sorted.
    fn keys(&self) -> AppResult<Vec<String>>;

    /// Get a typed value by deserializing from JSON.
    fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key)? {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    /// Set a typed value by serializing to JSON.
    fn set_json<T: serde::Serialize>(&self, key: &str, value: &T) -> AppResult<()>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(value)?;
        self.set(key, &json)
    }
}
