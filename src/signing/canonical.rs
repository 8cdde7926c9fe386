//! Parameter canonicalization prior to signing.

/// Name of the parameter carrying the signature.
pub const SIGN_PARAM: &str = "sign";

/// Produces the canonical string for a parameter set.
///
/// The [`SIGN_PARAM`] entry and every entry with an empty value are dropped, the rest are
/// sorted by the byte value of their keys and joined as `key=value` pairs with `&`.
pub fn canonicalize<I, K, V>(params: I) -> String
where
	I: IntoIterator<Item = (K, V)>,
	K: AsRef<str>,
	V: AsRef<str>,
{
	let mut pairs = params
		.into_iter()
		.filter(|(key, value)| key.as_ref() != SIGN_PARAM && !value.as_ref().is_empty())
		.collect::<Vec<_>>();

	pairs.sort_by(|(a, _), (b, _)| a.as_ref().as_bytes().cmp(b.as_ref().as_bytes()));

	pairs
		.iter()
		.map(|(key, value)| format!("{}={}", key.as_ref(), value.as_ref()))
		.collect::<Vec<_>>()
		.join("&")
}
