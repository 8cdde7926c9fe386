//! Scan-to-login ticket cache.
//!
//! A QR login session registers a ticket, an out-of-band callback confirms the scan and names
//! the subject, and the polling login request consumes the ticket exactly once. The cache is
//! an ordinary value: construct it once, share it behind an [`Arc`], and inject it into the
//! adapters and callback handlers that need it.

pub mod cache;
pub mod callback;

pub use cache::*;
pub use callback::*;

// self
use crate::{_prelude::*, auth::IdentifierError};

/// Failures raised on the confirmation side of the scan flow.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ScanError {
	/// Ticket was never issued or has already expired or been consumed.
	#[error("Scan ticket is unknown or expired.")]
	UnknownTicket,
	/// Ticket has already been confirmed once.
	#[error("Scan ticket has already been confirmed.")]
	AlreadyScanned,
	/// Callback signature does not match the shared secret.
	#[error("Scan callback signature does not match.")]
	CallbackSignatureMismatch,
	/// Callback carried a malformed ticket or subject id.
	#[error("Scan callback carried an invalid identifier.")]
	InvalidIdentifier(#[from] IdentifierError),
}
