//! Plumbing shared by every adapter: endpoint resolution, request builders, and response
//! decoding that turns embedded platform error codes into [`Error::Remote`].

// crates.io
use oauth2::http::{
	Method, Request,
	header::{ACCEPT, CONTENT_TYPE, HeaderName},
};
use serde::{Deserializer, de::Error as _};
use url::form_urlencoded::Serializer as FormSerializer;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, DecodeError, RemoteCode},
	http::{HttpRequest, HttpResponse, HttpTransport},
	provider::{EndpointRole, ProviderConfig, ProviderKind},
};

const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

/// Everything an adapter needs to talk to its platform.
#[derive(Clone)]
pub struct AdapterContext {
	kind: ProviderKind,
	config: Arc<ProviderConfig>,
	transport: Arc<dyn HttpTransport>,
}
impl AdapterContext {
	/// Bundles the kind, shared config, and transport.
	pub fn new(
		kind: ProviderKind,
		config: Arc<ProviderConfig>,
		transport: Arc<dyn HttpTransport>,
	) -> Self {
		Self { kind, config, transport }
	}

	/// Provider kind served by this context.
	pub fn kind(&self) -> ProviderKind {
		self.kind
	}

	/// Shared provider configuration.
	pub fn config(&self) -> &ProviderConfig {
		&self.config
	}

	/// Current transport.
	pub fn transport(&self) -> &dyn HttpTransport {
		self.transport.as_ref()
	}

	pub(crate) fn set_transport(&mut self, transport: Arc<dyn HttpTransport>) {
		self.transport = transport;
	}

	pub(crate) fn endpoint(&self, role: EndpointRole, default: &str) -> Result<Url> {
		Ok(self.config.endpoints.resolve(role, default)?)
	}

	pub(crate) fn endpoint_with_query(
		&self,
		role: EndpointRole,
		default: &str,
		query: &[(&str, &str)],
	) -> Result<Url> {
		let mut url = self.endpoint(role, default)?;

		url.query_pairs_mut().extend_pairs(query);

		Ok(url)
	}

	pub(crate) fn expiry(&self, declared_secs: i64) -> Option<OffsetDateTime> {
		self.config.quirks.expiry_at(declared_secs, OffsetDateTime::now_utc())
	}

	pub(crate) async fn send_raw(&self, request: HttpRequest) -> Result<HttpResponse> {
		self.transport.execute(request).await
	}

	pub(crate) async fn send<T>(&self, request: HttpRequest) -> Result<T>
	where
		T: DeserializeOwned + RemoteStatus,
	{
		let response = self.send_raw(request).await?;

		decode_response(&response)
	}

	pub(crate) async fn get_json<T>(&self, url: &Url) -> Result<T>
	where
		T: DeserializeOwned + RemoteStatus,
	{
		self.send(get_request(url, &[])?).await
	}

	pub(crate) async fn post_json<T>(&self, url: &Url, body: &serde_json::Value) -> Result<T>
	where
		T: DeserializeOwned + RemoteStatus,
	{
		self.send(json_request(url, body, &[])?).await
	}

	pub(crate) async fn post_form<T>(&self, url: &Url, form: &[(&str, &str)]) -> Result<T>
	where
		T: DeserializeOwned + RemoteStatus,
	{
		self.send(form_request(url, form.iter().copied(), &[])?).await
	}
}
impl Debug for AdapterContext {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AdapterContext")
			.field("kind", &self.kind)
			.field("config", &self.config)
			.finish_non_exhaustive()
	}
}

/// Exposes the platform error embedded in a decoded response body.
pub(crate) trait RemoteStatus {
	fn remote_error(&self) -> Option<(RemoteCode, String)>;
}

/// Implements [`RemoteStatus`] for bodies carrying WeChat-style `errcode`/`errmsg` fields.
macro_rules! errcode_status {
	($($ty:ty),+ $(,)?) => {
		$(
			impl $crate::adapter::common::RemoteStatus for $ty {
				fn remote_error(&self) -> Option<($crate::error::RemoteCode, String)> {
					(self.errcode != 0)
						.then(|| ($crate::error::RemoteCode::Numeric(self.errcode), self.errmsg.clone()))
				}
			}
		)+
	};
}
pub(crate) use errcode_status;

pub(crate) fn get_request(url: &Url, headers: &[(&str, &str)]) -> Result<HttpRequest> {
	build_request(Method::GET, url, headers, None)
}

pub(crate) fn json_request(
	url: &Url,
	body: &serde_json::Value,
	headers: &[(&str, &str)],
) -> Result<HttpRequest> {
	let body = serde_json::to_vec(body).map_err(ConfigError::from)?;

	build_request(Method::POST, url, headers, Some((JSON, body)))
}

pub(crate) fn form_request<'p, I>(
	url: &Url,
	form: I,
	headers: &[(&str, &str)],
) -> Result<HttpRequest>
where
	I: IntoIterator<Item = (&'p str, &'p str)>,
{
	let body = FormSerializer::new(String::new()).extend_pairs(form).finish();

	build_request(Method::POST, url, headers, Some((FORM, body.into_bytes())))
}

fn build_request(
	method: Method,
	url: &Url,
	headers: &[(&str, &str)],
	body: Option<(&str, Vec<u8>)>,
) -> Result<HttpRequest> {
	let mut builder = Request::builder().method(method).uri(url.as_str()).header(ACCEPT, JSON);

	for (name, value) in headers {
		let name = HeaderName::from_bytes(name.as_bytes())
			.map_err(oauth2::http::Error::from)
			.map_err(ConfigError::from)?;

		builder = builder.header(name, *value);
	}

	let request = match body {
		Some((content_type, body)) => builder.header(CONTENT_TYPE, content_type).body(body),
		None => builder.body(Vec::new()),
	};

	Ok(request.map_err(ConfigError::from)?)
}

/// Decodes a JSON body and surfaces embedded platform errors before checking the status.
pub(crate) fn decode_response<T>(response: &HttpResponse) -> Result<T>
where
	T: DeserializeOwned + RemoteStatus,
{
	let status = response.status();

	match parse_json::<T>(response.body(), status.as_u16()) {
		Ok(value) => {
			if let Some((code, message)) = value.remote_error() {
				return Err(Error::Remote { code, message });
			}
			if !status.is_success() {
				return Err(Error::unexpected_status(status.as_u16(), response.body()));
			}

			Ok(value)
		},
		Err(_) if !status.is_success() =>
			Err(Error::unexpected_status(status.as_u16(), response.body())),
		Err(e) => Err(e),
	}
}

pub(crate) fn parse_json<T>(body: &[u8], status: u16) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| DecodeError::Json { source, status: Some(status) }.into())
}

/// Fails unless the status is a success; used for non-JSON bodies.
pub(crate) fn ensure_success(response: &HttpResponse) -> Result<()> {
	let status = response.status();

	if status.is_success() {
		Ok(())
	} else {
		Err(Error::unexpected_status(status.as_u16(), response.body()))
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientScalar {
	Int(i64),
	Float(f64),
	Bool(bool),
	Text(String),
}

/// Accepts integers, numeric strings, or `null` (zero).
pub(crate) fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<LenientScalar>::deserialize(deserializer)? {
		None => Ok(0),
		Some(LenientScalar::Int(value)) => Ok(value),
		Some(LenientScalar::Float(value)) => Ok(value as i64),
		Some(LenientScalar::Text(value)) =>
			if value.trim().is_empty() {
				Ok(0)
			} else {
				value.trim().parse().map_err(D::Error::custom)
			},
		Some(LenientScalar::Bool(_)) => Err(D::Error::custom("expected an integer")),
	}
}

/// Accepts strings or numbers, rendering numbers in decimal; `null` becomes empty.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<LenientScalar>::deserialize(deserializer)? {
		None => Ok(String::new()),
		Some(LenientScalar::Int(value)) => Ok(value.to_string()),
		Some(LenientScalar::Float(value)) => Ok(value.to_string()),
		Some(LenientScalar::Bool(value)) => Ok(value.to_string()),
		Some(LenientScalar::Text(value)) => Ok(value),
	}
}
