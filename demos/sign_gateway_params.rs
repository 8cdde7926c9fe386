//! Signs a gateway parameter set with a bare base64 private key and checks the signature
//! against the derived public key.

// std
use std::collections::BTreeMap;
// crates.io
use color_eyre::Result;
// self
use idp_broker::signing::{
	RequestSigner, RsaRequestSigner, SIGN_PARAM, canonicalize, reconstruct_pem, verify_signature,
};

const BARE_KEY: &str = include_str!("../tests/fixtures/rsa_app_key.txt");

fn main() -> Result<()> {
	color_eyre::install()?;

	let pem = reconstruct_pem(BARE_KEY);

	println!("Reconstructed envelope starts with: {}", pem.lines().next().unwrap_or_default());

	let signer = RsaRequestSigner::from_material(BARE_KEY)?;
	let mut params = BTreeMap::from_iter(
		[
			("app_id", "2021000000000000"),
			("method", "alipay.system.oauth.token"),
			("charset", "utf-8"),
			("sign_type", "RSA2"),
			("timestamp", "2023-11-15 06:13:20"),
			("version", "1.0"),
			("grant_type", "authorization_code"),
			("code", "demo-code"),
			("refresh_token", ""),
		]
		.map(|(key, value)| (key.to_owned(), value.to_owned())),
	);

	signer.sign_params(&mut params)?;

	let canonical = canonicalize(params.iter());
	let signature = params.get(SIGN_PARAM).cloned().unwrap_or_default();

	println!("Canonical form: {canonical}");
	println!("Signature: {signature}");

	verify_signature(&signer.key().public_key(), &canonical, &signature)?;
	println!("Signature verifies against the derived public key.");

	Ok(())
}
