//! Walks through an official-account scan login without touching the network: issue a ticket,
//! confirm it the way the callback handler would, then redeem it through the adapter contract.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use time::Duration;
// self
use idp_broker::{
	adapter::{IdentityProvider, SCAN_ARTIFACT_PREFIX},
	provider::{ProviderConfig, ProviderRegistry},
	scan::{ScanConfirmation, ScanTicketCache, callback_signature},
};

const CALLBACK_SECRET: &str = "demo-callback-token";

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let cache = Arc::new(ScanTicketCache::new(Duration::minutes(10)));
	let registry = ProviderRegistry::default().with_scan_cache(Arc::clone(&cache));
	let wechat = registry.create(
		ProviderConfig::builder("WeChat").client_id("wx-demo-app").client_secret("demo").build()?,
	)?;
	// In production `start_scan_login` issues the QR ticket; here the cache issues one directly.
	let ticket = cache.issue()?;

	println!("Render a QR code for ticket {ticket}.");

	let (timestamp, nonce) = ("1700000000", "demo-nonce");
	let confirmation = ScanConfirmation {
		ticket: ticket.to_string(),
		subject: "oDemoUnionId".into(),
		timestamp: timestamp.into(),
		nonce: nonce.into(),
		signature: callback_signature(CALLBACK_SECRET, timestamp, nonce),
	};

	cache.confirm(CALLBACK_SECRET, &confirmation)?;

	let credential = wechat.exchange_credential(&format!("{SCAN_ARTIFACT_PREFIX}{ticket}")).await?;
	let identity = wechat.fetch_identity(&credential).await?;

	println!("Logged in as {} ({}).", identity.username, identity.id);

	match wechat.fetch_identity(&credential).await {
		Ok(_) => eprintln!("Ticket {ticket} was redeemed twice."),
		Err(e) => println!("Second poll rejected as expected: {e}"),
	}

	Ok(())
}
