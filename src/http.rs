use crate::cache::{ETagManager, Resolution};
use crate::error::CacheError;
use crate::io::{HttpRunner, HttpResponse};
use crate::store::Store;
use crate::{log_debug, log_info, Result};
use serde::{Deserialize, Serialize};
use std::collections::{hash_map, HashMap};
use std::fmt::{self, Display, Formatter};

/// Status codes driving the caching policy.
pub mod status {
    pub const OK: i32 = 200;
    pub const NOT_MODIFIED: i32 = 304;
    // Client and server errors start here. Never cached.
    pub const ERROR: i32 = 400;
}

/// Status and payload of a response as handed back to callers and as stored
/// in the cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResult {
    #[serde(rename = "responseCode")]
    pub status_code: i32,
    #[serde(rename = "payload")]
    pub body: String,
}

impl HttpResult {
    pub fn new(status_code: i32, body: &str) -> Self {
        HttpResult {
            status_code,
            body: body.to_string(),
        }
    }
}

impl Display for HttpResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HttpResult: status: {}, body length: {}",
            self.status_code,
            self.body.len()
        )
    }
}

/// Header map. Names are kept lowercase, lookups are case insensitive.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Headers(HashMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Headers(HashMap::new())
    }

    pub fn set<K: AsRef<str>, V: Into<String>>(&mut self, key: K, value: V) {
        self.0.insert(key.as_ref().to_lowercase(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.0.get(&key.to_lowercase())
    }

    pub fn extend(&mut self, headers: Headers) {
        self.0.extend(headers.0);
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, String> {
        self.0.iter()
    }
}

#[derive(Builder)]
#[builder(pattern = "owned")]
pub struct Request {
    #[builder(default)]
    headers: Headers,
    #[builder(setter(into))]
    url: String,
}

impl Request {
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    pub fn new(url: &str) -> Self {
        Request {
            headers: Headers::new(),
            url: url.to_string(),
        }
    }

    pub fn set_header(&mut self, key: &str, value: &str) {
        self.headers.set(key, value);
    }

    pub fn set_headers(&mut self, headers: Headers) {
        self.headers.extend(headers);
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }
}

/// Blocking HTTP transport. Status codes >= 400 come back as regular
/// responses so the cache can see them.
pub struct Client {
    agent: ureq::Agent,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    pub fn new() -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        Client { agent }
    }

    fn get(&self, request: &Request) -> Result<HttpResponse> {
        // set incoming requests headers
        let ureq_req = request
            .headers()
            .iter()
            .fold(self.agent.get(request.url()), |req, (key, value)| {
                req.header(key.as_str(), value.as_str())
            });
        let mut response = ureq_req.call()?;
        let status = i32::from(response.status().as_u16());
        // Grab headers for the etag lookup. Non visible ASCII values are
        // dropped.
        let headers = response
            .headers()
            .iter()
            .fold(Headers::new(), |mut headers, (name, value)| {
                if let Ok(value) = value.to_str() {
                    headers.set(name.as_str(), value);
                }
                headers
            });
        let body = response.body_mut().read_to_string()?;
        let response = HttpResponse::builder()
            .status(status)
            .body(body)
            .headers(headers)
            .build()?;
        Ok(response)
    }
}

impl HttpRunner for Client {
    type Response = HttpResponse;

    fn run(&self, cmd: &mut Request) -> Result<Self::Response> {
        log_debug!("GET {}", cmd.url());
        self.get(cmd)
    }
}

/// Drives a request through the etag cache. Attaches the stored validator,
/// resolves the response and, if the server answered 304 for something we do
/// not have, issues the request once more with a forced refresh.
pub struct ETagClient<R, S> {
    runner: R,
    cache: ETagManager<S>,
}

impl<R: HttpRunner<Response = HttpResponse>, S: Store> ETagClient<R, S> {
    pub fn new(runner: R, cache: ETagManager<S>) -> Self {
        ETagClient { runner, cache }
    }

    pub fn cache(&self) -> &ETagManager<S> {
        &self.cache
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// The url is used as the cache key. It already carries the API version.
    pub fn get(&self, url: &str, refresh_etag: bool) -> Result<HttpResult> {
        match self.fetch(url, refresh_etag)? {
            Resolution::Found(result) => Ok(result),
            Resolution::Retry if !refresh_etag => {
                log_info!("Not modified but no cached result, refreshing {}", url);
                match self.fetch(url, true)? {
                    Resolution::Found(result) => Ok(result),
                    Resolution::Retry => Err(retry_on_refresh(url)),
                }
            }
            Resolution::Retry => Err(retry_on_refresh(url)),
        }
    }

    fn fetch(&self, url: &str, refresh_etag: bool) -> Result<Resolution> {
        let mut request = Request::new(url);
        request.set_headers(self.cache.etag_header(url, refresh_etag)?);
        let response = self.runner.run(&mut request)?;
        self.cache.resolve(url, refresh_etag, &response)
    }
}

fn retry_on_refresh(url: &str) -> anyhow::Error {
    CacheError::ApplicationError(format!(
        "etag cache requested a retry on a refreshed request for {url}"
    ))
    .into()
}
