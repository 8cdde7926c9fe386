//! Authentication of the out-of-band scan confirmation callback.

// crates.io
use sha1::{Digest, Sha1};
// self
use crate::{
	_prelude::*,
	auth::SubjectId,
	obs::{CallSpan, Operation},
	scan::{ScanError, ScanTicketCache},
};

const SCAN_CALLBACK_LABEL: &str = "scan_callback";

/// Computes the callback signature: sort the three values, concatenate, SHA-1, lowercase hex.
pub fn callback_signature(shared_secret: &str, timestamp: &str, nonce: &str) -> String {
	let mut parts = [shared_secret, timestamp, nonce];

	parts.sort_unstable();

	let digest = Sha1::digest(parts.concat().as_bytes());

	format!("{digest:x}")
}

/// Returns `true` when `signature` matches the expected callback signature.
pub fn verify_callback_signature(
	shared_secret: &str,
	timestamp: &str,
	nonce: &str,
	signature: &str,
) -> bool {
	let expected = callback_signature(shared_secret, timestamp, nonce);

	constant_time_eq(expected.as_bytes(), signature.trim().to_ascii_lowercase().as_bytes())
}

// Visits every byte regardless of where the first mismatch sits.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
	if a.len() != b.len() {
		return false;
	}

	a.iter().zip(b).fold(0_u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Parameters delivered by the scan confirmation callback.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfirmation {
	/// Ticket named by the callback.
	pub ticket: String,
	/// Subject that scanned and approved the login.
	pub subject: String,
	/// Callback timestamp, as sent.
	pub timestamp: String,
	/// Callback nonce, as sent.
	pub nonce: String,
	/// Hex signature, as sent.
	pub signature: String,
}

impl ScanTicketCache {
	/// Authenticates a confirmation callback and marks its ticket as scanned.
	///
	/// A signature mismatch is rejected before the cache is touched.
	pub fn confirm(&self, shared_secret: &str, confirmation: &ScanConfirmation) -> Result<()> {
		self.confirm_at(shared_secret, confirmation, OffsetDateTime::now_utc())
	}

	/// [`confirm`](Self::confirm) with an explicit clock.
	pub fn confirm_at(
		&self,
		shared_secret: &str,
		confirmation: &ScanConfirmation,
		now: OffsetDateTime,
	) -> Result<()> {
		CallSpan::new(SCAN_CALLBACK_LABEL, Operation::ConfirmScan)
			.observe(|| self.confirm_now(shared_secret, confirmation, now))
	}

	fn confirm_now(
		&self,
		shared_secret: &str,
		confirmation: &ScanConfirmation,
		now: OffsetDateTime,
	) -> Result<()> {
		if !verify_callback_signature(
			shared_secret,
			&confirmation.timestamp,
			&confirmation.nonce,
			&confirmation.signature,
		) {
			return Err(ScanError::CallbackSignatureMismatch.into());
		}

		let subject = SubjectId::new(&confirmation.subject).map_err(ScanError::from)?;

		self.mark_scanned_at(&confirmation.ticket, subject, now)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::TicketId;

	const SECRET: &str = "callback-secret";
	const TIMESTAMP: &str = "1409659813";
	const NONCE: &str = "1372623149";
	// sha1("1372623149" + "1409659813" + "callback-secret")
	const EXPECTED: &str = "281ee44cb9010e28ce0658b306d80194319605d3";

	fn confirmation(signature: &str) -> ScanConfirmation {
		ScanConfirmation {
			ticket: "abc123".into(),
			subject: "subjectX".into(),
			timestamp: TIMESTAMP.into(),
			nonce: NONCE.into(),
			signature: signature.into(),
		}
	}

	#[test]
	fn signature_sorts_before_hashing() {
		assert_eq!(callback_signature(SECRET, TIMESTAMP, NONCE), EXPECTED);
		assert_eq!(callback_signature(NONCE, SECRET, TIMESTAMP), EXPECTED);
		assert!(verify_callback_signature(SECRET, TIMESTAMP, NONCE, &EXPECTED.to_uppercase()));
		assert!(!verify_callback_signature(SECRET, TIMESTAMP, "0", EXPECTED));
	}

	#[test]
	fn digest_comparison_rejects_near_misses() {
		let mut flipped = EXPECTED.as_bytes().to_vec();

		flipped[39] = b'4';

		assert!(constant_time_eq(EXPECTED.as_bytes(), EXPECTED.as_bytes()));
		assert!(!constant_time_eq(EXPECTED.as_bytes(), &flipped));
		assert!(!constant_time_eq(EXPECTED.as_bytes(), &EXPECTED.as_bytes()[..39]));
		assert!(verify_callback_signature(SECRET, TIMESTAMP, NONCE, &format!(" {EXPECTED}\n")));
	}

	#[test]
	fn valid_callback_marks_ticket() {
		let cache = ScanTicketCache::default();

		cache.create(TicketId::new("abc123").expect("Ticket fixture should be valid."));
		cache.confirm(SECRET, &confirmation(EXPECTED)).expect("Confirmation should succeed.");

		assert_eq!(
			cache.read_and_consume("abc123").expect("Ticket should be consumable.").as_ref(),
			"subjectX"
		);
	}

	#[test]
	fn forged_callback_leaves_ticket_untouched() {
		let cache = ScanTicketCache::default();

		cache.create(TicketId::new("abc123").expect("Ticket fixture should be valid."));

		let err = cache
			.confirm(SECRET, &confirmation("deadbeef"))
			.expect_err("Forged signature must be rejected.");

		assert!(matches!(err, Error::Scan(ScanError::CallbackSignatureMismatch)));
		assert!(!cache.peek("abc123").expect("Ticket should still exist.").scanned);
	}

	#[test]
	fn malformed_subjects_are_rejected() {
		let cache = ScanTicketCache::default();
		let mut bad = confirmation(EXPECTED);

		bad.subject = String::new();
		cache.create(TicketId::new("abc123").expect("Ticket fixture should be valid."));

		assert!(matches!(
			cache.confirm(SECRET, &bad),
			Err(Error::Scan(ScanError::InvalidIdentifier(_)))
		));
	}
}
