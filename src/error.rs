//! Crate-level error types shared across adapters, the signing subsystem, and the scan cache.

// self
use crate::{_prelude::*, provider::EndpointRole};

pub use crate::{scan::ScanError, signing::SigningError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const BODY_PREVIEW_LIMIT: usize = 256;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body does not match the expected shape.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Key material or signature failure inside the signing subsystem.
	#[error(transparent)]
	Signing(#[from] SigningError),
	/// Scan confirmation callback was rejected.
	#[error(transparent)]
	Scan(#[from] ScanError),

	/// Platform reported a domain error, usually inside an HTTP 200 body.
	#[error("Remote API returned error {code}: {message}.")]
	Remote {
		/// Platform-specific error code.
		code: RemoteCode,
		/// Platform-supplied message.
		message: String,
	},
	/// Platform answered with a non-success status and no decodable domain error.
	#[error("Remote API returned HTTP {status}: {body}.")]
	UnexpectedStatus {
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		body: String,
	},
	/// Remote subject exists but may not sign in through this provider.
	#[error("Remote subject was rejected: {reason}.")]
	SubjectRejected {
		/// Why the subject is not eligible.
		reason: String,
	},
	/// Scan ticket is absent, expired, or has not been confirmed yet.
	#[error("Scan ticket is unknown or has not been scanned yet.")]
	NotScannedOrUnknown,
}
impl Error {
	/// Builds a [`Error::Remote`] value.
	pub fn remote(code: impl Into<RemoteCode>, message: impl Into<String>) -> Self {
		Self::Remote { code: code.into(), message: message.into() }
	}

	pub(crate) fn unexpected_status(status: u16, body: &[u8]) -> Self {
		Self::UnexpectedStatus { status, body: truncate_preview(body) }
	}
}

/// Error code reported by a remote platform.
///
/// Some platforms use integers (`40163`), others symbolic strings (`invalid_grant`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteCode {
	/// Integer error code.
	Numeric(i64),
	/// Symbolic error code.
	Symbolic(String),
}
impl RemoteCode {
	/// Returns `true` when the code denotes success (`0`, `"0"`, or an empty string).
	pub fn is_success(&self) -> bool {
		match self {
			Self::Numeric(code) => *code == 0,
			Self::Symbolic(code) => code.is_empty() || code == "0",
		}
	}
}
impl Default for RemoteCode {
	fn default() -> Self {
		Self::Numeric(0)
	}
}
impl From<i64> for RemoteCode {
	fn from(value: i64) -> Self {
		Self::Numeric(value)
	}
}
impl From<&str> for RemoteCode {
	fn from(value: &str) -> Self {
		Self::Symbolic(value.to_owned())
	}
}
impl From<String> for RemoteCode {
	fn from(value: String) -> Self {
		Self::Symbolic(value)
	}
}
impl Display for RemoteCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Numeric(code) => write!(f, "{code}"),
			Self::Symbolic(code) => f.write_str(code),
		}
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Provider kind string does not name a supported adapter.
	#[error("Provider kind `{kind}` is not supported.")]
	UnsupportedProviderKind {
		/// Kind string supplied by the caller.
		kind: String,
	},
	/// Client identifier is empty.
	#[error("Provider config is missing a client id.")]
	MissingClientId,
	/// Endpoints must use HTTPS.
	#[error("The {role} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Endpoint role that failed validation.
		role: EndpointRole,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Built-in or configured endpoint could not be parsed.
	#[error("The {role} endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Endpoint role that failed to parse.
		role: EndpointRole,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Credential handed to an adapter carries another adapter's side channel.
	#[error("Credential for {kind} is missing its {expected} side channel.")]
	CredentialMismatch {
		/// Adapter kind label.
		kind: &'static str,
		/// Side-channel variant the adapter expected.
		expected: &'static str,
	},
	/// Scan-login was requested from an adapter constructed without a ticket cache.
	#[error("Scan login requires a ticket cache but none was injected.")]
	ScanLoginUnavailable,
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	RequestBody(#[from] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the remote endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the remote endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Response decoding failures.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// JSON body could not be mapped onto the expected structure.
	#[error("Response body does not match the expected shape.")]
	Json {
		/// Structured parsing failure, including the failing path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: Option<u16>,
	},
	/// Body is not in the expected wire format (form-encoded, JSONP, ...).
	#[error("Response body is not in the expected format: {reason}.")]
	Format {
		/// What was wrong with the body.
		reason: String,
	},
	/// Response decoded but omitted a field every identity needs.
	#[error("Response is missing the required `{field}` field.")]
	MissingField {
		/// Name of the missing field.
		field: &'static str,
	},
}

pub(crate) fn truncate_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);

	if text.len() <= BODY_PREVIEW_LIMIT {
		return text.into_owned();
	}

	let mut end = BODY_PREVIEW_LIMIT;

	while !text.is_char_boundary(end) {
		end -= 1;
	}

	format!("{}...", &text[..end])
}
