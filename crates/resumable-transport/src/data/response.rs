use std::fmt;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};

use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use http::{HeaderMap, StatusCode};

use crate::error::Result;

/// A boxed stream type for response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// The byte stream carried by a [`Body`].
pub type BodyStream = BoxStream<'static, Result<Bytes>>;

/// Status line and headers of a response, without the body.
#[derive(Debug, Clone)]
pub struct Parts {
    pub status:  StatusCode,
    pub headers: HeaderMap,
}

/// An HTTP response whose body is consumed incrementally.
#[derive(Debug)]
pub struct Response {
    parts: Parts,
    body:  Body,
}

impl Response {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Body) -> Self {
        Self {
            parts: Parts { status, headers },
            body,
        }
    }

    pub fn from_parts(parts: Parts, body: Body) -> Self { Self { parts, body } }

    pub fn into_parts(self) -> (Parts, Body) { (self.parts, self.body) }

    pub fn status(&self) -> StatusCode { self.parts.status }

    pub fn headers(&self) -> &HeaderMap { &self.parts.headers }

    pub fn body(&self) -> &Body { &self.body }

    pub fn body_mut(&mut self) -> &mut Body { &mut self.body }

    pub fn into_body(self) -> Body { self.body }
}

/// A response body: a stream of byte chunks or the empty-body sentinel.
///
/// A stream item of `Err` means the transfer broke; `None` is the natural end
/// of the body and is never an error. Reads keep any unread remainder of the
/// current chunk, so mixing [`Body::read`] and [`Body::chunk`] never loses bytes.
#[derive(Default)]
pub struct Body {
    stream:   Option<BodyStream>,
    buffered: Bytes,
    closed:   bool,
}

impl Body {
    /// The empty-body sentinel: nothing to read, nothing to resume.
    pub fn empty() -> Self { Self::default() }

    /// Wrap a chunk stream.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes>> + Send + 'static,
    {
        Self {
            stream: Some(Box::pin(stream)),
            ..Self::default()
        }
    }

    /// A body that yields `bytes` as a single chunk. Empty input gives the empty sentinel.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        if bytes.is_empty() {
            Self::empty()
        } else {
            Self::from_stream(futures_util::stream::once(async move { Ok(bytes) }))
        }
    }

    /// Returns `true` for the empty-body sentinel.
    pub fn is_empty(&self) -> bool { self.stream.is_none() && self.buffered.is_empty() }

    /// Take the next chunk, or `None` once the body is finished.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>> {
        if !self.buffered.is_empty() {
            return Ok(Some(std::mem::take(&mut self.buffered)));
        }
        if self.closed {
            return Err(crate::error::Error::BodyClosed);
        }
        let Some(stream) = self.stream.as_mut() else {
            return Ok(None);
        };
        match stream.next().await {
            Some(Ok(chunk)) => Ok(Some(chunk)),
            Some(Err(e)) => Err(e),
            None => {
                self.stream = None;
                Ok(None)
            }
        }
    }

    /// Read into `buf`, returning the number of bytes copied.
    ///
    /// `Ok(0)` with a non-empty `buf` means the body is finished.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.buffered.is_empty() {
            match self.chunk().await? {
                Some(chunk) => self.buffered = chunk,
                None => return Ok(0),
            }
        }
        let n = buf.len().min(self.buffered.len());
        buf[..n].copy_from_slice(&self.buffered.split_to(n));
        Ok(n)
    }

    /// Collect the rest of the body.
    pub async fn bytes(mut self) -> Result<Bytes> {
        let mut out = BytesMut::new();
        while let Some(chunk) = self.chunk().await? {
            out.extend_from_slice(&chunk);
        }
        Ok(out.freeze())
    }

    /// Drop the underlying stream, closing its connection.
    ///
    /// Later reads fail with [`Error::BodyClosed`](crate::Error::BodyClosed).
    pub fn close(&mut self) {
        self.stream = None;
        self.buffered = Bytes::new();
        self.closed = true;
    }

    /// Take the raw chunk stream, or `None` if nothing is left to read.
    pub fn into_stream(self) -> Option<BodyStream> {
        let Body {
            stream, buffered, ..
        } = self;
        if buffered.is_empty() {
            return stream;
        }
        let head = futures_util::stream::once(async move { Ok(buffered) });
        match stream {
            Some(stream) => Some(Box::pin(head.chain(stream))),
            None => Some(Box::pin(head)),
        }
    }
}

impl Stream for Body {
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if !this.buffered.is_empty() {
            return Poll::Ready(Some(Ok(std::mem::take(&mut this.buffered))));
        }
        if this.closed {
            return Poll::Ready(Some(Err(crate::error::Error::BodyClosed)));
        }
        let Some(stream) = this.stream.as_mut() else {
            return Poll::Ready(None);
        };
        match stream.as_mut().poll_next(cx) {
            Poll::Ready(None) => {
                this.stream = None;
                Poll::Ready(None)
            }
            other => other,
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("stream", &self.stream.as_ref().map(|_| "{ ... }"))
            .field("buffered", &self.buffered.len())
            .field("closed", &self.closed)
            .finish()
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self { Body::from_bytes(bytes) }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self { Body::from_bytes(Bytes::from_static(s.as_bytes())) }
}
