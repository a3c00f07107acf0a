//! Scripted transport double shared by the unit tests.

use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

use bytes::Bytes;
use http::{HeaderMap, StatusCode};

use crate::data::{Body, Request, Response};
use crate::effects::transport::Transport;
use crate::error::{Error, Result};

/// Answers requests from a queue and records what it was asked.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Response>>>,
    requests:  Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self { Self::default() }

    pub(crate) fn then(self, response: Result<Response>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub(crate) fn requests(&self) -> Vec<Request> { self.requests.lock().unwrap().clone() }

    pub(crate) fn calls(&self) -> usize { self.requests.lock().unwrap().len() }

    /// `Range` header of the `n`th request, if any.
    pub(crate) fn range_of(&self, n: usize) -> Option<String> {
        self.requests.lock().unwrap()[n]
            .headers()
            .get(http::header::RANGE)
            .map(|v| v.to_str().unwrap().to_string())
    }
}

impl Transport for ScriptedTransport {
    async fn execute(&self, request: Request) -> Result<Response> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::transport(io::Error::other("no scripted response"))))
    }
}

pub(crate) fn reset() -> Error {
    Error::stream(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset by peer"))
}

/// A body that yields `parts` and then ends normally.
pub(crate) fn complete(parts: &[&'static str]) -> Body {
    let items: Vec<Result<Bytes>> = parts
        .iter()
        .map(|p| Ok(Bytes::from_static(p.as_bytes())))
        .collect();
    Body::from_stream(futures_util::stream::iter(items))
}

/// A body that yields `parts` and then fails with `err`.
pub(crate) fn broken(parts: &[&'static str], err: Error) -> Body {
    let mut items: Vec<Result<Bytes>> = parts
        .iter()
        .map(|p| Ok(Bytes::from_static(p.as_bytes())))
        .collect();
    items.push(Err(err));
    Body::from_stream(futures_util::stream::iter(items))
}

pub(crate) fn response(status: StatusCode, body: Body) -> Result<Response> {
    Ok(Response::new(status, HeaderMap::new(), body))
}
