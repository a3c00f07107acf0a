use http::StatusCode;

/// How a server answered a ranged resume request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// `206 Partial Content` with a body: splice it in.
    Continue,
    /// `206 Partial Content` but nothing to read.
    EmptyBody,
    /// Any other status. A `200` means the server ignored the range.
    Unsupported,
}

/// Build the open-ended `Range` value asking for everything from `offset` on.
///
/// # Examples
///
/// ```
/// use resumable_transport::range_header;
///
/// assert_eq!(range_header(0), "bytes=0-");
/// assert_eq!(range_header(1024), "bytes=1024-");
/// ```
pub fn range_header(offset: u64) -> String { format!("bytes={offset}-") }

/// Classify the answer to a resume request.
///
/// `Content-Range` and `Content-Length` are not inspected. Only
/// the status code decides whether the server honoured the range.
pub fn resume_outcome(status: StatusCode, has_body: bool) -> ResumeOutcome {
    match (status, has_body) {
        (StatusCode::PARTIAL_CONTENT, true) => ResumeOutcome::Continue,
        (StatusCode::PARTIAL_CONTENT, false) => ResumeOutcome::EmptyBody,
        _ => ResumeOutcome::Unsupported,
    }
}
