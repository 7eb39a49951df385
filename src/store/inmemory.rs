use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::CacheError;
use crate::store::Store;
use crate::Result;

#[derive(Default)]
pub struct InMemoryStore {
    data: Mutex<HashMap<String, String>>,
    // Number of put and clear_all calls. Lets tests verify that resolving a
    // response did not touch the store.
    writes: Mutex<u32>,
}

impl InMemoryStore {
    pub fn writes(&self) -> u32 {
        self.writes.lock().map(|writes| *writes).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.data.lock().map(|data| data.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn data(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.data.lock().map_err(|_| {
            CacheError::ApplicationError("in memory store - poisoned lock".to_string()).into()
        })
    }

    fn count_write(&self) {
        if let Ok(mut writes) = self.writes.lock() {
            *writes += 1;
        }
    }
}

impl Store for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data()?.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.data()?.insert(key.to_string(), value.to_string());
        self.count_write();
        Ok(())
    }

    fn clear_all(&self) -> Result<()> {
        self.data()?.clear();
        self.count_write();
        Ok(())
    }
}
