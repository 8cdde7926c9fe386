//! Injectable HTTP transport.
//!
//! Adapters never build an HTTP client themselves. They receive an [`HttpTransport`] (usually
//! shared as `Arc<dyn HttpTransport>`) and send every request through it, so timeouts,
//! proxies, TLS roots, and cancellation stay under the caller's control.

pub use oauth2::{HttpRequest, HttpResponse};

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use oauth2::http::{Method, header::CONTENT_TYPE};
// self
use crate::{_prelude::*, error::ConfigError};
#[cfg(feature = "reqwest")] use crate::error::TransportError;

/// Boxed future returned by transports.
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse>> + 'a + Send>>;

/// Minimal HTTP surface the adapters depend on.
///
/// Implementations must be `Send + Sync + 'static` so one instance can serve every adapter
/// and request handler concurrently. Transport failures should surface as
/// [`Error::Transport`]; non-success statuses are returned as ordinary responses.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes a fully built request.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_>;

	/// Issues a body-less `GET`.
	fn get(&self, url: &Url) -> TransportFuture<'_> {
		let request = oauth2::http::Request::builder()
			.method(Method::GET)
			.uri(url.as_str())
			.body(Vec::new());

		match request {
			Ok(request) => self.execute(request),
			Err(e) => Box::pin(async move { Err(ConfigError::from(e).into()) }),
		}
	}

	/// Issues a `POST` carrying `body` with the given content type.
	fn post(&self, url: &Url, content_type: &str, body: Vec<u8>) -> TransportFuture<'_> {
		let request = oauth2::http::Request::builder()
			.method(Method::POST)
			.uri(url.as_str())
			.header(CONTENT_TYPE, content_type)
			.body(body);

		match request {
			Ok(request) => self.execute(request),
			Err(e) => Box::pin(async move { Err(ConfigError::from(e).into()) }),
		}
	}
}

/// Thin wrapper around [`ReqwestClient`] implementing [`HttpTransport`].
///
/// Configure timeouts and redirect policy on the wrapped client; the transport itself adds
/// no retries.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let request = reqwest::Request::try_from(request).map_err(ConfigError::from)?;
			let response = client.execute(request).await.map_err(TransportError::from)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await.map_err(TransportError::from)?;
			let mut response_new = HttpResponse::new(body.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
