//! Normalize heterogeneous third-party identity providers behind one exchange/fetch contract,
//! with signed gateway requests and scan-to-login tickets included.

#![deny(clippy::all, unused_crate_dependencies)]
#![warn(missing_docs)]

pub mod adapter;
pub mod auth;
pub mod country;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod scan;
pub mod signing;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests.

	pub use crate::_prelude::*;

	// self
	use crate::{
		http::{HttpTransport, ReqwestTransport},
		provider::{EndpointRole, ProviderConfig, ProviderConfigBuilder},
	};

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_transport() -> Arc<dyn HttpTransport> {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		Arc::new(ReqwestTransport::with_client(client))
	}

	/// Seeds a config builder whose endpoints all point at the provided mock server.
	///
	/// `base` is the mock server origin (e.g. `server.base_url()`) and each route pairs an
	/// endpoint role with the path served by the mock.
	pub fn mock_config_builder(
		kind: &str,
		base: &str,
		routes: &[(EndpointRole, &str)],
	) -> ProviderConfigBuilder {
		let mut builder =
			ProviderConfig::builder(kind).client_id("mock-client").client_secret("mock-secret");

		for (role, path) in routes {
			let url = Url::parse(&format!("{base}{path}"))
				.expect("Mock endpoint should parse successfully.");

			builder = builder.endpoint(*role, url);
		}

		builder
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _, tokio as _};
