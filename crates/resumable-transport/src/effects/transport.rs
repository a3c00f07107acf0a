use std::future::Future;
use std::sync::Arc;

use crate::data::{Request, Response};
use crate::error::Result;

/// One request/response exchange.
///
/// This is the only capability the resume machinery needs from the network:
/// send a request, get the status, headers and a body stream back. The
/// production implementation is [`ReqwestTransport`]; tests plug in scripted
/// doubles.
///
/// Implementations should honour [`Request::ctx`] while sending and while the
/// body streams.
pub trait Transport: Send + Sync + 'static {
    /// Perform the exchange.
    ///
    /// # Errors
    ///
    /// Returns an error if no response could be obtained (DNS failure,
    /// connection refused, context fired, ...). HTTP error statuses are not
    /// errors at this layer.
    fn execute(&self, request: Request) -> impl Future<Output = Result<Response>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn execute(&self, request: Request) -> impl Future<Output = Result<Response>> + Send {
        (**self).execute(request)
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_transport {
    use bytes::Bytes;
    use futures_util::StreamExt;
    use http::{Method, StatusCode};

    use super::*;
    use crate::context::Context;
    use crate::data::{Body, BodyStream};
    use crate::error::Error;

    /// Production transport backed by a `reqwest::Client`.
    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        /// Create a transport with a default client.
        pub fn new() -> Result<Self> {
            let client = reqwest::Client::builder().build().map_err(Error::transport)?;
            Ok(Self { client })
        }

        /// Reuse an existing, already configured client.
        pub fn with_client(client: reqwest::Client) -> Self { Self { client } }

        pub fn client(&self) -> &reqwest::Client { &self.client }
    }

    impl Transport for ReqwestTransport {
        async fn execute(&self, request: Request) -> Result<Response> {
            let context = request.ctx().clone();
            let is_head = request.method() == Method::HEAD;

            let mut builder = self
                .client
                .request(request.method().clone(), request.url())
                .headers(request.headers().clone());
            if let Some(payload) = request.payload() {
                builder = builder.body(payload.clone());
            }

            let response = tokio::select! {
                biased;
                _ = context.done() => return Err(Error::DeadlineExceeded),
                sent = builder.send() => sent.map_err(Error::transport)?,
            };

            let status = response.status();
            let headers = response.headers().clone();
            let body = if is_head || has_no_body(status, response.content_length()) {
                Body::empty()
            } else {
                Body::from_stream(bounded(response.bytes_stream().boxed(), context))
            };

            Ok(Response::new(status, headers, body))
        }
    }

    fn has_no_body(status: StatusCode, content_length: Option<u64>) -> bool {
        status == StatusCode::NO_CONTENT
            || status == StatusCode::NOT_MODIFIED
            || content_length == Some(0)
    }

    /// Map reqwest body errors and stop the stream with an error once `context` fires.
    fn bounded(
        stream: futures_util::stream::BoxStream<'static, reqwest::Result<Bytes>>,
        context: Context,
    ) -> BodyStream {
        let stream = futures_util::stream::unfold(Some((stream, context)), |state| async move {
            let (mut stream, context) = state?;
            tokio::select! {
                biased;
                _ = context.done() => Some((Err(Error::DeadlineExceeded), None)),
                item = stream.next() => {
                    let item = item?;
                    Some((item.map_err(Error::stream), Some((stream, context))))
                }
            }
        });
        Box::pin(stream)
    }

}

#[cfg(feature = "reqwest")]
pub use reqwest_transport::ReqwestTransport;
