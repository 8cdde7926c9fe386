// self
use crate::{
	_prelude::*,
	obs::{self, CallOutcome, Operation},
};

/// One observed call: an `idp_broker.call` span (feature `tracing`) plus the attempt and
/// outcome counters (feature `metrics`).
///
/// The span's `outcome` field stays empty until the call finishes.
#[derive(Clone, Debug)]
pub struct CallSpan {
	provider: &'static str,
	operation: Operation,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Opens a span tagged with the provider label and operation.
	pub fn new(provider: &'static str, operation: Operation) -> Self {
		#[cfg(feature = "tracing")]
		let span = tracing::info_span!(
			"idp_broker.call",
			provider,
			operation = operation.as_str(),
			outcome = tracing::field::Empty,
		);

		Self {
			provider,
			operation,
			#[cfg(feature = "tracing")]
			span,
		}
	}

	/// Provider label the call is attributed to.
	pub fn provider(&self) -> &'static str {
		self.provider
	}

	/// Operation the call performs.
	pub fn operation(&self) -> Operation {
		self.operation
	}

	/// Runs a synchronous call inside the span.
	pub fn observe<T>(&self, call: impl FnOnce() -> Result<T>) -> Result<T> {
		self.count(CallOutcome::Attempt);

		#[cfg(feature = "tracing")]
		let result = self.span.in_scope(call);
		#[cfg(not(feature = "tracing"))]
		let result = call();

		self.finish(&result);

		result
	}

	/// Awaits an async call inside the span; no guard is held across `.await` points.
	pub async fn observe_async<F, T>(self, call: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		self.count(CallOutcome::Attempt);

		#[cfg(feature = "tracing")]
		let result = {
			use tracing::Instrument;

			call.instrument(self.span.clone()).await
		};
		#[cfg(not(feature = "tracing"))]
		let result = call.await;

		self.finish(&result);

		result
	}

	fn count(&self, outcome: CallOutcome) {
		obs::record_call_outcome(self.provider, self.operation, outcome);
	}

	fn finish<T>(&self, result: &Result<T>) {
		let outcome = CallOutcome::from_result(result);

		#[cfg(feature = "tracing")]
		{
			self.span.record("outcome", outcome.as_str());
		}

		self.count(outcome);
	}
}
