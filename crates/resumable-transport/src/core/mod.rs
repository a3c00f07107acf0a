//! Pure transformations used by the resume state machine.
//!
//! Nothing in here performs I/O; the functions decide what the effects layer
//! sends and how it interprets what comes back.

mod backoff;
mod range;

pub use backoff::{MAX_RESUME_DELAY, resume_delay};
pub use range::{ResumeOutcome, range_header, resume_outcome};
