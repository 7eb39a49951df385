//! ETag driven response cache.
//!
//! Decides whether a completed exchange is served from the backend payload or
//! from a previously stored result, and persists fresh cacheable results keyed
//! by request path. Staleness is decided by the server alone: a 304 means the
//! stored representation is still current, anything else replaces it.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::api_defaults::ETAG_HEADER_NAME;
use crate::error::CacheError;
use crate::http::{status, Headers, HttpResult};
use crate::io::HttpExchange;
use crate::store::Store;
use crate::{log_debug, log_info, log_warn, Result};

/// Unit of storage per path. The ETag and its result are always written
/// together.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResult {
    #[serde(rename = "eTag")]
    pub etag: String,
    #[serde(rename = "httpResult")]
    pub result: HttpResult,
}

impl CachedResult {
    pub fn new(etag: &str, result: HttpResult) -> Self {
        CachedResult {
            etag: etag.to_string(),
            result,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(data: &str) -> serde_json::Result<Self> {
        serde_json::from_str(data)
    }
}

/// Outcome of resolving an exchange against the cache.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Found(HttpResult),
    /// The server answered 304 but there is nothing stored for the path. The
    /// request has to be issued again with a forced refresh.
    Retry,
}

pub fn should_use_cached_version(status_code: i32) -> bool {
    status_code == status::NOT_MODIFIED
}

/// Single cacheability rule: not a 304 and below the error threshold.
pub fn is_cacheable_status(status_code: i32) -> bool {
    status_code != status::NOT_MODIFIED && status_code < status::ERROR
}

pub struct ETagManager<S> {
    store: S,
    header_name: String,
    // Serializes the mutating operations: storing a result and clearing.
    lock: Mutex<()>,
}

impl<S: Store> ETagManager<S> {
    pub fn new(store: S) -> Self {
        ETagManager {
            store,
            header_name: ETAG_HEADER_NAME.to_string(),
            lock: Mutex::new(()),
        }
    }

    pub fn with_header_name(mut self, header_name: &str) -> Self {
        self.header_name = header_name.to_lowercase();
        self
    }

    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Header to attach to an outgoing request for `path`. A forced refresh
    /// sends an empty validator so the server replies with the full payload.
    pub fn etag_header(&self, path: &str, refresh_etag: bool) -> Result<Headers> {
        let etag = if refresh_etag {
            String::new()
        } else {
            self.etag(path)?
        };
        let mut headers = Headers::new();
        headers.set(self.header_name.as_str(), etag);
        Ok(headers)
    }

    pub fn resolve<E: HttpExchange>(
        &self,
        path: &str,
        refresh_etag: bool,
        exchange: &E,
    ) -> Result<Resolution> {
        let from_backend = HttpResult::new(exchange.status(), exchange.body());
        let Some(etag) = exchange.header(&self.header_name) else {
            log_debug!("No {} header in response for {}", self.header_name, path);
            return Ok(Resolution::Found(from_backend));
        };
        if should_use_cached_version(from_backend.status_code) {
            return match self.stored_record(path)? {
                Some(record) => {
                    log_debug!("Not modified, using cached result for {}", path);
                    self.revalidate(path, &record, etag)?;
                    Ok(Resolution::Found(record.result))
                }
                None if refresh_etag => {
                    log_warn!(
                        "Request for {} was already retried with a refreshed etag \
                         and the server still answered not modified. Returning \
                         backend result: {}",
                        path,
                        from_backend
                    );
                    Ok(Resolution::Found(from_backend))
                }
                None => {
                    log_debug!("Not modified but no cached result for {}", path);
                    Ok(Resolution::Retry)
                }
            };
        }
        self.store_if_no_error(path, &from_backend, etag)?;
        Ok(Resolution::Found(from_backend))
    }

    pub fn stored_result(&self, path: &str) -> Result<Option<HttpResult>> {
        Ok(self.stored_record(path)?.map(|record| record.result))
    }

    pub fn stored_record(&self, path: &str) -> Result<Option<CachedResult>> {
        match self.store.get(path)? {
            Some(data) => {
                let record =
                    CachedResult::from_json(&data).map_err(|err| CacheError::CorruptRecord {
                        key: path.to_string(),
                        reason: err.to_string(),
                    })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    pub fn store_if_no_error(&self, path: &str, result: &HttpResult, etag: &str) -> Result<()> {
        if is_cacheable_status(result.status_code) {
            return self.store_result(path, result, etag);
        }
        Ok(())
    }

    pub fn clear_all(&self) -> Result<()> {
        let _guard = self.acquire()?;
        log_info!("Clearing all cached results");
        self.store.clear_all()
    }

    fn store_result(&self, path: &str, result: &HttpResult, etag: &str) -> Result<()> {
        let data = CachedResult::new(etag, result.clone()).to_json()?;
        let _guard = self.acquire()?;
        log_debug!("Caching result for {} with etag {}", path, etag);
        self.store.put(path, &data)
    }

    // A 304 only ever refreshes the validator. The stored body stays.
    fn revalidate(&self, path: &str, record: &CachedResult, etag: &str) -> Result<()> {
        if record.etag == etag {
            return Ok(());
        }
        self.store_result(path, &record.result, etag)
    }

    fn etag(&self, path: &str) -> Result<String> {
        Ok(self
            .stored_record(path)?
            .map(|record| record.etag)
            .unwrap_or_default())
    }

    fn acquire(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.lock.lock().map_err(|_| {
            CacheError::ApplicationError(
                "etag cache - cannot acquire the store write lock".to_string(),
            )
            .into()
        })
    }
}
