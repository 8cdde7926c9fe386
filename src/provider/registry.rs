//! Factory turning a [`ProviderConfig`] into an [`Adapter`].

// self
use crate::{
	_prelude::*,
	adapter::{Adapter, AdapterContext},
	http::HttpTransport,
	provider::{ProviderConfig, ProviderKind},
	scan::ScanTicketCache,
};

/// Constructs adapters that share one transport and, optionally, one scan ticket cache.
#[derive(Clone)]
pub struct ProviderRegistry {
	transport: Arc<dyn HttpTransport>,
	scan_cache: Option<Arc<ScanTicketCache>>,
}
impl ProviderRegistry {
	/// Creates a registry that hands `transport` to every adapter it builds.
	pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
		Self { transport, scan_cache: None }
	}

	/// Injects the ticket cache used by scan-login capable adapters.
	pub fn with_scan_cache(mut self, cache: Arc<ScanTicketCache>) -> Self {
		self.scan_cache = Some(cache);

		self
	}

	/// Returns the injected ticket cache, if any.
	pub fn scan_cache(&self) -> Option<&Arc<ScanTicketCache>> {
		self.scan_cache.as_ref()
	}

	/// Lists every kind [`create`](Self::create) accepts.
	pub fn supported_kinds(&self) -> &'static [ProviderKind] {
		&ProviderKind::ALL
	}

	/// Builds the adapter for `config.kind`.
	///
	/// Fails with [`ConfigError::UnsupportedProviderKind`](crate::error::ConfigError) for an
	/// unknown kind and with other [`ConfigError`](crate::error::ConfigError) variants when
	/// the config is invalid. No network traffic happens here.
	pub fn create(&self, config: impl Into<Arc<ProviderConfig>>) -> Result<Adapter> {
		let config = config.into();
		let kind = config.kind.parse::<ProviderKind>()?;

		config.validate()?;

		let ctx = AdapterContext::new(kind, config, Arc::clone(&self.transport));

		Ok(Adapter::new(ctx, self.scan_cache.clone()))
	}
}
#[cfg(feature = "reqwest")]
impl Default for ProviderRegistry {
	fn default() -> Self {
		Self::new(Arc::new(crate::http::ReqwestTransport::default()))
	}
}
impl Debug for ProviderRegistry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderRegistry")
			.field("scan_cache", &self.scan_cache.is_some())
			.finish_non_exhaustive()
	}
}
