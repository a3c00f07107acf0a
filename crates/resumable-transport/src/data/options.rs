use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::context::Context;

/// Limits on how a body reconnects after the stream breaks.
///
/// Deserializable so applications can keep it next to the rest of their
/// configuration; missing fields fall back to the defaults.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use resumable_transport::ResumePolicy;
///
/// let policy = ResumePolicy::default()
///     .max_resumes(Some(5))
///     .resume_backoff(Duration::from_millis(200));
/// assert_eq!(policy.max_resumes, Some(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumePolicy {
    /// Maximum number of resume requests one body may issue.
    ///
    /// Once reached, the next failure is terminal and reports the first
    /// recorded stream error.
    ///
    /// Default: `None` (unlimited; bounded only by the request context)
    ///
    /// With no budget and no context deadline, a server that keeps breaking
    /// its `206` bodies before the first byte holds a single read forever.
    /// Set a budget or a deadline when talking to untrusted servers.
    pub max_resumes: Option<u32>,

    /// Base pause before a resume request.
    ///
    /// Doubles for every consecutive resume that produced no bytes, see
    /// [`resume_delay`](crate::resume_delay).
    ///
    /// Default: zero (resume immediately)
    pub resume_backoff: Duration,
}

impl Default for ResumePolicy {
    fn default() -> Self {
        Self {
            max_resumes:    None,
            resume_backoff: Duration::ZERO,
        }
    }
}

impl ResumePolicy {
    #[must_use]
    pub fn max_resumes(mut self, max_resumes: Option<u32>) -> Self {
        self.max_resumes = max_resumes;
        self
    }

    #[must_use]
    pub fn resume_backoff(mut self, resume_backoff: Duration) -> Self {
        self.resume_backoff = resume_backoff;
        self
    }

    /// Returns `true` if `attempts` resumes already used up the budget.
    pub fn exhausted(&self, attempts: u32) -> bool {
        self.max_resumes.is_some_and(|max| attempts >= max)
    }
}

/// Construction-time configuration of a [`ResumeTransport`](crate::ResumeTransport).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use resumable_transport::{Context, ResumeOptions};
///
/// let options = ResumeOptions::default()
///     .context(Context::with_timeout(Duration::from_secs(600)))
///     .max_resumes(Some(10));
/// assert!(options.context.is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResumeOptions {
    /// Cancellation signal of the logical download this wrapper serves.
    ///
    /// When set, the wrapper installs at most one resumable body until the
    /// context is replaced with
    /// [`ResumeTransport::set_context`](crate::ResumeTransport::set_context).
    ///
    /// Default: `None` (no single-use guard)
    pub context: Option<Context>,

    /// Reconnect limits handed to every body.
    pub policy: ResumePolicy,
}

impl ResumeOptions {
    #[must_use]
    pub fn context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: ResumePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn max_resumes(mut self, max_resumes: Option<u32>) -> Self {
        self.policy.max_resumes = max_resumes;
        self
    }

    #[must_use]
    pub fn resume_backoff(mut self, resume_backoff: Duration) -> Self {
        self.policy.resume_backoff = resume_backoff;
        self
    }
}
