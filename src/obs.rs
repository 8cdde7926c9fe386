//! Optional observability helpers for adapter calls and scan confirmations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `idp_broker.call` with the `provider` and
//!   `operation` fields.
//! - Enable `metrics` to increment the `idp_broker_call_total` counter for every
//!   attempt/success/failure, labeled by `provider`, `operation`, and `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Artifact to credential exchange.
	ExchangeCredential,
	/// Credential to identity lookup.
	FetchIdentity,
	/// QR scan-login session start.
	StartScanLogin,
	/// Scan confirmation callback.
	ConfirmScan,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::ExchangeCredential => "exchange_credential",
			Operation::FetchIdentity => "fetch_identity",
			Operation::StartScanLogin => "start_scan_login",
			Operation::ConfirmScan => "confirm_scan",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}

	/// Classifies a finished call.
	pub fn from_result<T, E>(result: &std::result::Result<T, E>) -> Self {
		if result.is_ok() { CallOutcome::Success } else { CallOutcome::Failure }
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
