//! Immutable data types: requests, responses and configuration.

pub mod options;
pub mod request;
pub mod response;

pub use options::{ResumeOptions, ResumePolicy};
pub use request::Request;
pub use response::{Body, BodyStream, BoxStream, Parts, Response};
