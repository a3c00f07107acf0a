//! Transport decorator that makes response bodies resumable.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use crate::context::Context;
use crate::data::{Request, Response, ResumeOptions, ResumePolicy};
use crate::effects::body::ResumableBody;
use crate::effects::transport::Transport;
use crate::error::{Error, Result};

struct Guard {
    context: Option<Context>,
    used:    bool,
}

/// Wraps a [`Transport`] so every non-empty response body reconnects from
/// the last delivered byte when its stream breaks.
///
/// When a context is configured, the wrapper hands out at most one resumable
/// body per context: the second request fails with [`Error::ContextUsed`]
/// until [`set_context`](Self::set_context) arms a new one. Responses with an
/// empty body pass through untouched and do not spend the context.
///
/// # Examples
///
/// ```no_run
/// use resumable_transport::{Context, Request, ResumeOptions, ResumeTransport, Transport};
///
/// # async fn run() -> resumable_transport::Result<()> {
/// let ctx = Context::background();
/// let transport = ResumeTransport::new(ResumeOptions::default().context(ctx.clone()))?;
///
/// let response = transport
///     .execute(Request::get("https://example.com/large.bin").context(ctx))
///     .await?;
/// let bytes = response.into_body().bytes().await?;
/// # let _ = bytes;
/// # Ok(())
/// # }
/// ```
pub struct ResumeTransport<T> {
    transport: Arc<T>,
    guard:     Mutex<Guard>,
    policy:    ResumePolicy,
}

#[cfg(feature = "reqwest")]
impl ResumeTransport<crate::effects::transport::ReqwestTransport> {
    /// Wrap a default [`ReqwestTransport`](crate::ReqwestTransport).
    pub fn new(options: ResumeOptions) -> Result<Self> {
        let transport = crate::effects::transport::ReqwestTransport::new()?;
        Ok(Self::with_transport(transport, options))
    }
}

impl<T: Transport> ResumeTransport<T> {
    /// Wrap `transport`, which is shared with every body this wrapper installs.
    pub fn with_transport(transport: T, options: ResumeOptions) -> Self {
        Self {
            transport: Arc::new(transport),
            guard:     Mutex::new(Guard {
                context: options.context,
                used:    false,
            }),
            policy:    options.policy,
        }
    }

    /// Replace the configured context and re-arm the single-use guard.
    ///
    /// `None` disables the guard.
    pub fn set_context(&self, context: Option<Context>) {
        let mut guard = self.lock();
        guard.context = context;
        guard.used = false;
    }

    /// The configured context, if any.
    pub fn context(&self) -> Option<Context> { self.lock().context.clone() }

    /// Returns `true` once the configured context was spent on a body.
    pub fn is_used(&self) -> bool { self.lock().used }

    /// The wrapped transport.
    pub fn transport(&self) -> &T { &self.transport }

    /// Reconnect limits handed to every body.
    pub fn policy(&self) -> &ResumePolicy { &self.policy }

    // The guard holds no invariant a panic could break, so poisoning is ignored.
    fn lock(&self) -> std::sync::MutexGuard<'_, Guard> {
        self.guard.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spend the configured context, if any.
    fn claim(&self, url: &str) -> Result<()> {
        let mut guard = self.lock();
        if guard.context.is_none() {
            return Ok(());
        }
        if guard.used {
            warn!(url, "context already used by an earlier download");
            return Err(Error::ContextUsed);
        }
        guard.used = true;
        Ok(())
    }
}

impl<T: Transport> Transport for ResumeTransport<T> {
    async fn execute(&self, request: Request) -> Result<Response> {
        let original = request.clone();
        let response = self.transport.execute(request).await?;

        if response.body().is_empty() {
            return Ok(response);
        }

        // Dropping the response here releases its connection.
        self.claim(original.url())?;

        debug!(
            url = %original.url(),
            status = %response.status(),
            "installing resumable body"
        );
        let (parts, upstream) = response.into_parts();
        let body =
            ResumableBody::new(original, upstream, self.transport.clone(), self.policy.clone());
        Ok(Response::from_parts(parts, body.into_body()))
    }
}

impl<T> std::fmt::Debug for ResumeTransport<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("ResumeTransport")
            .field("context", &guard.context)
            .field("used", &guard.used)
            .field("policy", &self.policy)
            .finish()
    }
}
