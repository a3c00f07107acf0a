//! Resumable response body.
//!
//! [`ResumableBody`] owns the current upstream stream and counts every byte
//! handed to the caller. When the upstream breaks it reissues the original
//! request with `Range: bytes=<delivered>-` and, if the server answers
//! `206 Partial Content`, continues from the new stream as if nothing happened.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::Stream;
use tracing::{debug, warn};

use crate::core::{ResumeOutcome, resume_delay, resume_outcome};
use crate::data::{Body, Request, ResumePolicy};
use crate::effects::transport::Transport;
use crate::error::{Error, Result};

enum State {
    /// Upstream active, no failure pending.
    Streaming(Body),
    /// The last resume request could not be dispatched; the next read tries
    /// again. Carries the first stream error.
    Disconnected(Error),
    /// End of stream reached.
    Exhausted,
    /// Terminal. The stored error is returned on every later read.
    Failed(Error),
    Closed,
}

/// A response body that reconnects with range requests when the stream breaks.
///
/// Reads take `&mut self`, so one body is always consumed by one reader at a
/// time; there is no internal lock.
pub struct ResumableBody<T> {
    request:     Request,
    transport:   Arc<T>,
    policy:      ResumePolicy,
    state:       State,
    /// Pulled from upstream but not yet handed out by `read`.
    pending:     Bytes,
    delivered:   u64,
    first_error: Option<Error>,
    resumes:     u32,
    /// Resumes since the last chunk arrived, drives the backoff.
    stalled:     u32,
}

impl<T: Transport> ResumableBody<T> {
    /// Wrap `upstream`, the body of the response to `request`.
    ///
    /// `request` is kept to build resume requests; its context decides when
    /// resuming stops.
    pub fn new(request: Request, upstream: Body, transport: Arc<T>, policy: ResumePolicy) -> Self {
        Self {
            request,
            transport,
            policy,
            state: State::Streaming(upstream),
            pending: Bytes::new(),
            delivered: 0,
            first_error: None,
            resumes: 0,
            stalled: 0,
        }
    }

    /// Bytes returned to the caller so far; the offset of the next resume.
    pub fn bytes_delivered(&self) -> u64 { self.delivered }

    /// Resume requests issued so far.
    pub fn resume_count(&self) -> u32 { self.resumes }

    /// The first stream failure seen, if any.
    pub fn first_error(&self) -> Option<&Error> { self.first_error.as_ref() }

    /// Take the next chunk, reconnecting as needed. `None` means the body is complete.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>> {
        let chunk = if self.pending.is_empty() {
            self.pull().await?
        } else {
            Some(std::mem::take(&mut self.pending))
        };
        if let Some(chunk) = &chunk {
            self.delivered += chunk.len() as u64;
        }
        Ok(chunk)
    }

    /// Read into `buf`, returning the number of bytes copied.
    ///
    /// `Ok(0)` with a non-empty `buf` means the body is complete. Only the
    /// bytes copied count as delivered; the rest of a chunk waits for the
    /// next read.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.pending.is_empty() {
            match self.pull().await? {
                Some(chunk) => self.pending = chunk,
                None => return Ok(0),
            }
        }
        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending.split_to(n));
        self.delivered += n as u64;
        Ok(n)
    }

    /// Close the active upstream and abandon further resumes.
    pub fn close(&mut self) {
        self.pending = Bytes::new();
        self.state = State::Closed;
    }

    /// Box the body into a plain [`Body`].
    pub fn into_body(self) -> Body { Body::from_stream(self.into_stream()) }

    /// Turn the body into a chunk stream.
    ///
    /// Polling again after an error follows the read rules: a failed resume
    /// dispatch is retried, a terminal failure repeats its error.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes>> + Send + 'static {
        futures_util::stream::unfold(self, |mut body| async move {
            match body.chunk().await {
                Ok(Some(chunk)) => Some((Ok(chunk), body)),
                Ok(None) => None,
                Err(err) => Some((Err(err), body)),
            }
        })
    }

    /// Next chunk from upstream. Only called with nothing pending, so
    /// `delivered` is exactly what upstream produced so far.
    async fn pull(&mut self) -> Result<Option<Bytes>> {
        loop {
            let upstream = match &mut self.state {
                State::Streaming(upstream) => upstream,
                State::Disconnected(first_error) => {
                    let first_error = first_error.clone();
                    self.resume(first_error).await?;
                    continue;
                }
                State::Exhausted => return Ok(None),
                State::Failed(err) => return Err(err.clone()),
                State::Closed => return Err(Error::BodyClosed),
            };

            match upstream.chunk().await {
                Ok(Some(chunk)) => {
                    if !chunk.is_empty() {
                        self.stalled = 0;
                    }
                    return Ok(Some(chunk));
                }
                Ok(None) => {
                    self.state = State::Exhausted;
                    return Ok(None);
                }
                Err(err) => {
                    debug!(
                        url = %self.request.url(),
                        offset = self.delivered,
                        error = %err,
                        "body stream broke"
                    );
                    let first_error = self.first_error.get_or_insert(err).clone();
                    // Replacing the state drops the dead upstream.
                    self.state = State::Disconnected(first_error.clone());
                    self.resume(first_error).await?;
                }
            }
        }
    }

    async fn resume(&mut self, first_error: Error) -> Result<()> {
        if self.request.ctx().is_done() {
            return Err(self.fail(Error::DeadlineExceeded));
        }

        if self.policy.exhausted(self.resumes) {
            warn!(
                url = %self.request.url(),
                resumes = self.resumes,
                "resume budget exhausted"
            );
            return Err(self.fail(first_error));
        }

        let delay = resume_delay(self.stalled, self.policy.resume_backoff);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
            if self.request.ctx().is_done() {
                return Err(self.fail(Error::DeadlineExceeded));
            }
        }

        let request = match self.request.resume_from(self.delivered) {
            Ok(request) => request,
            Err(err) => return Err(self.fail(err)),
        };

        self.resumes += 1;
        self.stalled = self.stalled.saturating_add(1);
        debug!(
            url = %self.request.url(),
            offset = self.delivered,
            attempt = self.resumes,
            "resuming body"
        );

        // A dispatch failure is returned as is and the body stays disconnected.
        let response = self.transport.execute(request).await?;

        let status = response.status();
        let upstream = response.into_body();
        match resume_outcome(status, !upstream.is_empty()) {
            ResumeOutcome::Continue => {
                self.state = State::Streaming(upstream);
                Ok(())
            }
            outcome => {
                warn!(
                    url = %self.request.url(),
                    status = %status,
                    ?outcome,
                    "server did not resume body"
                );
                Err(self.fail(first_error))
            }
        }
    }

    fn fail(&mut self, err: Error) -> Error {
        self.state = State::Failed(err.clone());
        err
    }
}

impl<T> fmt::Debug for ResumableBody<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            State::Streaming(_) => "streaming",
            State::Disconnected(_) => "disconnected",
            State::Exhausted => "exhausted",
            State::Failed(_) => "failed",
            State::Closed => "closed",
        };
        f.debug_struct("ResumableBody")
            .field("url", &self.request.url())
            .field("state", &state)
            .field("delivered", &self.delivered)
            .field("resumes", &self.resumes)
            .finish()
    }
}
