//! Per-provider workarounds for platforms whose token metadata cannot be taken at face value.

// self
use crate::_prelude::*;

/// Lifetime assumed when a platform reports no usable `expires_in`.
pub const DEFAULT_FALLBACK_TOKEN_LIFETIME_SECS: u32 = 7200;

/// Provider-specific workarounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Lifetime substituted when the declared expiry is zero or missing; `None` leaves the
	/// credential without an expiry.
	pub fallback_token_lifetime_secs: Option<u32>,
}
impl ProviderQuirks {
	/// Resolves the absolute expiry for a declared `expires_in` observed at `now`.
	///
	/// A declared lifetime that overflows the calendar range is treated like a missing one.
	pub fn expiry_at(&self, declared_secs: i64, now: OffsetDateTime) -> Option<OffsetDateTime> {
		let declared = if declared_secs > 0 {
			now.checked_add(Duration::seconds(declared_secs))
		} else {
			None
		};

		declared.or_else(|| {
			self.fallback_token_lifetime_secs
				.and_then(|secs| now.checked_add(Duration::seconds(i64::from(secs))))
		})
	}
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self { fallback_token_lifetime_secs: Some(DEFAULT_FALLBACK_TOKEN_LIFETIME_SECS) }
	}
}
