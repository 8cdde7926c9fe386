//! Normalized credential returned by every adapter's exchange step.

// self
use crate::{_prelude::*, auth::{TicketId, TokenSecret}};

/// Access token plus the provider-specific side channel the fetch step needs.
///
/// Credentials live for one exchange-then-fetch cycle and are never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
	/// Bearer token (or session key) issued by the platform.
	pub access_token: TokenSecret,
	/// Token type reported by the platform, `Bearer` when unspecified.
	pub token_type: String,
	/// Refresh token, when issued.
	pub refresh_token: Option<TokenSecret>,
	/// Absolute expiry instant, when known.
	pub expiry: Option<OffsetDateTime>,
	/// Typed side channel consumed by the fetch step.
	pub extra: CredentialExtra,
}
impl Credential {
	/// Creates a bearer credential without refresh token, expiry, or side channel.
	pub fn bearer(access_token: impl Into<TokenSecret>) -> Self {
		Self {
			access_token: access_token.into(),
			token_type: "Bearer".into(),
			refresh_token: None,
			expiry: None,
			extra: CredentialExtra::None,
		}
	}

	/// Creates a credential that stands for a pending scan-login ticket.
	pub fn scan_ticket(ticket: TicketId) -> Self {
		Self {
			access_token: TokenSecret::default(),
			token_type: "ScanTicket".into(),
			refresh_token: None,
			expiry: None,
			extra: CredentialExtra::ScanTicket { ticket },
		}
	}

	/// Overrides the token type.
	pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
		let token_type = token_type.into();

		if !token_type.is_empty() {
			self.token_type = token_type;
		}

		self
	}

	/// Attaches a refresh token; empty values are ignored.
	pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
		let refresh_token = refresh_token.into();

		if !refresh_token.is_empty() {
			self.refresh_token = Some(TokenSecret::new(refresh_token));
		}

		self
	}

	/// Sets the absolute expiry.
	pub fn with_expiry(mut self, expiry: Option<OffsetDateTime>) -> Self {
		self.expiry = expiry;

		self
	}

	/// Attaches the side channel.
	pub fn with_extra(mut self, extra: CredentialExtra) -> Self {
		self.extra = extra;

		self
	}

	/// Returns `true` once the expiry has passed at `now`.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		self.expiry.is_some_and(|expiry| expiry <= now)
	}
}

/// Typed side channel carried from the exchange step to the fetch step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CredentialExtra {
	/// No side channel is required.
	None,
	/// Application-scoped subject id (and union id when already known).
	OpenId {
		/// Application-scoped subject id.
		open_id: String,
		/// Cross-application subject id, when the exchange returned it.
		union_id: Option<String>,
	},
	/// One-time authorization code replayed against the identity endpoint.
	AuthCode {
		/// Authorization code received from the login redirect.
		code: String,
	},
	/// Numeric user id returned next to the token.
	Uid {
		/// User id as a decimal string.
		uid: String,
	},
	/// Pending scan-login ticket resolved through the ticket cache.
	ScanTicket {
		/// Ticket issued when the QR session started.
		ticket: TicketId,
	},
}
impl CredentialExtra {
	/// Returns a stable label for the variant.
	pub const fn label(&self) -> &'static str {
		match self {
			Self::None => "none",
			Self::OpenId { .. } => "open_id",
			Self::AuthCode { .. } => "auth_code",
			Self::Uid { .. } => "uid",
			Self::ScanTicket { .. } => "scan_ticket",
		}
	}
}
