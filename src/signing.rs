//! Request signing for gateways that authenticate each call with an RSA signature instead of a
//! bearer token.
//!
//! Signing runs in three steps: [`canonicalize`] the parameter set, digest the canonical string
//! with SHA-256, then sign the digest with RSA PKCS#1 v1.5. The base64 signature travels as the
//! [`SIGN_PARAM`] parameter next to the original parameters.

pub mod canonical;
pub mod key;

pub use canonical::*;
pub use key::*;

// self
use crate::_prelude::*;

/// Failures raised while parsing key material or producing signatures.
#[derive(Debug, ThisError)]
pub enum SigningError {
	/// Key material does not parse as an RSA private key.
	#[error("Private key material is malformed: {reason}.")]
	KeyFormat {
		/// Parser diagnostics.
		reason: String,
	},
	/// RSA signing operation failed.
	#[error("RSA signing failed.")]
	Signature {
		/// Underlying RSA failure.
		#[source]
		source: rsa::Error,
	},
	/// Signature does not match the canonical payload.
	#[error("Signature does not verify against the canonical payload.")]
	Verification,
	/// Request timestamp could not be rendered into the signed parameter set.
	#[error("Signed request timestamp could not be formatted.")]
	Timestamp(#[from] time::error::Format),
}

/// Signs an outbound parameter set in place.
pub trait RequestSigner
where
	Self: Send + Sync,
{
	/// Computes the signature over the canonical form of `params` and inserts it as
	/// [`SIGN_PARAM`].
	fn sign_params(&self, params: &mut BTreeMap<String, String>) -> Result<(), SigningError>;
}

/// [`RequestSigner`] backed by an RSA private key (SHA-256 + PKCS#1 v1.5).
#[derive(Clone, Debug)]
pub struct RsaRequestSigner {
	key: SigningKey,
}
impl RsaRequestSigner {
	/// Wraps an already parsed key.
	pub fn new(key: SigningKey) -> Self {
		Self { key }
	}

	/// Parses key material (enveloped or bare base64) and wraps it.
	pub fn from_material(raw: &str) -> Result<Self, SigningError> {
		SigningKey::from_material(raw).map(Self::new)
	}

	/// Returns the signing key.
	pub fn key(&self) -> &SigningKey {
		&self.key
	}
}
impl RequestSigner for RsaRequestSigner {
	fn sign_params(&self, params: &mut BTreeMap<String, String>) -> Result<(), SigningError> {
		let canonical = canonicalize(params.iter());
		let signature = self.key.sign_canonical(&canonical)?;

		params.insert(SIGN_PARAM.to_owned(), signature);

		Ok(())
	}
}
