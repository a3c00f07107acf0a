//! HTTP transport decorator that resumes broken response bodies.
//!
//! [`ResumeTransport`] wraps any [`Transport`]. Each non-empty response body
//! it returns counts the bytes handed to the reader; when the underlying
//! stream fails, the body reissues the original request with
//! `Range: bytes=<delivered>-` and keeps reading from the `206 Partial
//! Content` answer. The reader only sees an error when the server will not
//! resume, the resume budget runs out or the request's [`Context`] fires.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - `data` - Requests, responses and configuration
//! - `core` - Pure decisions: range headers, resume outcomes, backoff
//! - `effects` - The transport seam and the resumable body
//!
//! # Key Features
//!
//! - **Transparent**: Status and headers of the first response are kept as is
//! - **Single-Use Context**: A configured context backs at most one body
//! - **Sticky Diagnosis**: A failed resume reports the stream error that caused it

mod context;
mod core;
mod data;
mod effects;
mod error;

pub use crate::core::{MAX_RESUME_DELAY, ResumeOutcome, range_header, resume_delay, resume_outcome};
pub use context::Context;
pub use data::{Body, BodyStream, BoxStream, Parts, Request, Response, ResumeOptions, ResumePolicy};
pub use effects::{ResumableBody, ResumeTransport, Transport};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestTransport;

pub use error::{Error, Result, SharedError};
