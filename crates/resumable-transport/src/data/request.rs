use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue, RANGE};
use http::Method;

use crate::context::Context;
use crate::core::range_header;
use crate::error::{Error, Result};

/// An outbound request descriptor.
///
/// Cloning is cheap: the body is reference counted, so a resume request
/// shares the original payload instead of copying it.
#[derive(Debug, Clone)]
pub struct Request {
    method:  Method,
    url:     String,
    headers: HeaderMap,
    body:    Option<Bytes>,
    context: Context,
}

impl Request {
    /// Create a request with no headers, no body and a background context.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            context: Context::background(),
        }
    }

    /// Shorthand for a `GET` request.
    pub fn get(url: impl Into<String>) -> Self { Self::new(Method::GET, url) }

    /// Append a header, keeping earlier values for the same name.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Set the request payload.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Attach the cancellation signal that bounds this request and its body.
    #[must_use]
    pub fn context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn method(&self) -> &Method { &self.method }

    pub fn url(&self) -> &str { &self.url }

    pub fn headers(&self) -> &HeaderMap { &self.headers }

    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }

    pub fn payload(&self) -> Option<&Bytes> { self.body.as_ref() }

    pub fn ctx(&self) -> &Context { &self.context }

    /// Clone this request, asking for the body from byte `offset` onwards.
    ///
    /// Any `Range` header on the original is replaced.
    pub fn resume_from(&self, offset: u64) -> Result<Request> {
        let value = HeaderValue::try_from(range_header(offset))
            .map_err(|e| Error::InvalidRequest(format!("range header: {e}")))?;

        let mut request = self.clone();
        request.headers.insert(RANGE, value);
        Ok(request)
    }
}
