//! Bridge into the `oauth2` crate for providers that follow the standard code exchange.

pub use oauth2;

// crates.io
use oauth2::{
	AsyncHttpClient, AuthType, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet,
	EndpointSet, RedirectUrl, RequestTokenError, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, DecodeError},
	http::{HttpRequest, HttpTransport, TransportFuture},
	provider::EndpointRole,
};

type TokenOnlyClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Adapts any [`HttpTransport`] into an [`AsyncHttpClient`] so `oauth2` requests share the
/// caller-injected transport.
pub struct OAuth2Bridge<'t>(pub &'t dyn HttpTransport);
impl<'c, 't> AsyncHttpClient<'c> for OAuth2Bridge<'t> {
	type Error = Error;
	type Future = TransportFuture<'c>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		self.0.execute(request)
	}
}

/// Authorization code exchange against a standards-conformant token endpoint.
///
/// Client credentials travel in the request body.
pub struct StandardCodeExchange {
	client: TokenOnlyClient,
}
impl StandardCodeExchange {
	/// Configures the exchange for one client.
	pub fn new(
		client_id: &str,
		client_secret: &str,
		token_url: &Url,
		redirect_url: Option<&Url>,
	) -> Result<Self> {
		let token_url = TokenUrl::new(token_url.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { role: EndpointRole::Token, source })?;
		let mut client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_client_secret(ClientSecret::new(client_secret.to_owned()))
			.set_auth_type(AuthType::RequestBody)
			.set_token_uri(token_url);

		if let Some(redirect) = redirect_url {
			let redirect_url = RedirectUrl::new(redirect.to_string()).map_err(|source| {
				ConfigError::InvalidEndpoint { role: EndpointRole::Redirect, source }
			})?;

			client = client.set_redirect_uri(redirect_url);
		}

		Ok(Self { client })
	}

	/// Redeems `code` through `transport`.
	pub async fn exchange(
		&self,
		transport: &dyn HttpTransport,
		code: &str,
	) -> Result<BasicTokenResponse> {
		let bridge = OAuth2Bridge(transport);

		self.client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.request_async(&bridge)
			.await
			.map_err(map_request_error)
	}
}

fn map_request_error(err: RequestTokenError<Error, BasicErrorResponse>) -> Error {
	match err {
		RequestTokenError::ServerResponse(response) => {
			let code = response.error().as_ref().to_owned();
			let message = response.error_description().cloned().unwrap_or_else(|| code.clone());

			Error::remote(code, message)
		},
		RequestTokenError::Request(error) => error,
		RequestTokenError::Parse(source, _body) => DecodeError::Json { source, status: None }.into(),
		RequestTokenError::Other(reason) => DecodeError::Format { reason }.into(),
	}
}
