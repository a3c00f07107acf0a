//! I/O side of the crate: the transport seam, the resumable body and the
//! wrapper that installs it.

mod body;
mod transport;
mod wrapper;

#[cfg(test)]
pub(crate) mod testing;

pub use body::ResumableBody;
pub use transport::Transport;
pub use wrapper::ResumeTransport;

#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
