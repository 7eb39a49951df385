use crate::{
    http::{Headers, Request},
    Result,
};

/// A trait for the HTTP protocol. Implementors accept a `Request` that wraps
/// the url and headers. Clients can potentially do HTTP calls against a remote
/// server or mock the responses for testing purposes.
pub trait HttpRunner {
    type Response;
    fn run(&self, cmd: &mut Request) -> Result<Self::Response>;
}

/// Read side of a completed HTTP exchange. This is all the ETag cache needs
/// from the transport.
pub trait HttpExchange {
    fn status(&self) -> i32;
    fn body(&self) -> &str;
    /// Case insensitive lookup of a single response header.
    fn header(&self, name: &str) -> Option<&str>;
}

/// Adapts lower level HTTP outputs to a common Response.
#[derive(Clone, Debug, Builder)]
pub struct HttpResponse {
    #[builder(default)]
    pub status: i32,
    #[builder(default)]
    pub body: String,
    /// Response headers with lowercase names.
    #[builder(setter(into, strip_option), default)]
    pub headers: Option<Headers>,
}

impl HttpResponse {
    pub fn builder() -> HttpResponseBuilder {
        HttpResponseBuilder::default()
    }
}

impl HttpExchange for HttpResponse {
    fn status(&self) -> i32 {
        self.status
    }

    fn body(&self) -> &str {
        &self.body
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()
            .and_then(|h| h.get(name))
            .map(|s| s.as_str())
    }
}
