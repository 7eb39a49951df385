pub mod filesystem;
pub mod inmemory;

use crate::Result;
pub use filesystem::FileStore;
pub use inmemory::InMemoryStore;

/// Durable key-value store backing the etag cache. All operations are
/// synchronous and durable once they return. `put` overwrites.
pub trait Store {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
    fn clear_all(&self) -> Result<()>;
}

impl<S: Store + ?Sized> Store for &S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        (**self).put(key, value)
    }

    fn clear_all(&self) -> Result<()> {
        (**self).clear_all()
    }
}
