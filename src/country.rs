//! International calling code to ISO 3166-1 alpha-2 lookup.

/// Region returned for calling codes missing from the table.
pub const DEFAULT_COUNTRY: &str = "CN";

/// Maps an international calling code (`"86"`, `"+44"`) to an ISO 3166-1 alpha-2 code.
///
/// The function is total: unknown or malformed input yields [`DEFAULT_COUNTRY`].
pub fn calling_code_to_iso(calling_code: &str) -> &'static str {
	let code = calling_code.trim();
	let code = code.strip_prefix('+').unwrap_or(code);

	match code {
		"86" => "CN",
		"1" => "US",
		"44" => "GB",
		"81" => "JP",
		"82" => "KR",
		"91" => "IN",
		"33" => "FR",
		"49" => "DE",
		"39" => "IT",
		"7" => "RU",
		"61" => "AU",
		"55" => "BR",
		"52" => "MX",
		"34" => "ES",
		"31" => "NL",
		"46" => "SE",
		"47" => "NO",
		"45" => "DK",
		"358" => "FI",
		"41" => "CH",
		"43" => "AT",
		"32" => "BE",
		"351" => "PT",
		"30" => "GR",
		"48" => "PL",
		"420" => "CZ",
		"36" => "HU",
		"40" => "RO",
		"359" => "BG",
		"385" => "HR",
		"386" => "SI",
		"421" => "SK",
		"372" => "EE",
		"371" => "LV",
		"370" => "LT",
		"353" => "IE",
		"354" => "IS",
		"352" => "LU",
		"377" => "MC",
		"378" => "SM",
		"39066" => "VA",
		"376" => "AD",
		"350" => "GI",
		"356" => "MT",
		"357" => "CY",
		"90" => "TR",
		"972" => "IL",
		"971" => "AE",
		"966" => "SA",
		"965" => "KW",
		"974" => "QA",
		"973" => "BH",
		"968" => "OM",
		"962" => "JO",
		"961" => "LB",
		"963" => "SY",
		"964" => "IQ",
		"98" => "IR",
		"93" => "AF",
		"92" => "PK",
		"880" => "BD",
		"94" => "LK",
		"95" => "MM",
		"66" => "TH",
		"84" => "VN",
		"855" => "KH",
		"856" => "LA",
		"60" => "MY",
		"65" => "SG",
		"62" => "ID",
		"63" => "PH",
		"673" => "BN",
		"670" => "TL",
		"852" => "HK",
		"853" => "MO",
		"886" => "TW",
		"20" => "EG",
		"27" => "ZA",
		"234" => "NG",
		"254" => "KE",
		"233" => "GH",
		"212" => "MA",
		"213" => "DZ",
		"216" => "TN",
		"218" => "LY",
		"249" => "SD",
		"251" => "ET",
		"256" => "UG",
		"255" => "TZ",
		"250" => "RW",
		"257" => "BI",
		"243" => "CD",
		"242" => "CG",
		"236" => "CF",
		"235" => "TD",
		"237" => "CM",
		"240" => "GQ",
		"241" => "GA",
		"239" => "ST",
		"238" => "CV",
		"245" => "GW",
		"224" => "GN",
		"221" => "SN",
		"223" => "ML",
		"226" => "BF",
		"227" => "NE",
		"229" => "BJ",
		"228" => "TG",
		"225" => "CI",
		"231" => "LR",
		"232" => "SL",
		"220" => "GM",
		_ => DEFAULT_COUNTRY,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn known_codes_resolve() {
		assert_eq!(calling_code_to_iso("86"), "CN");
		assert_eq!(calling_code_to_iso("1"), "US");
		assert_eq!(calling_code_to_iso("39066"), "VA");
		assert_eq!(calling_code_to_iso("+44"), "GB");
		assert_eq!(calling_code_to_iso(" 852 "), "HK");
	}

	#[test]
	fn unknown_codes_fall_back_to_default() {
		assert_eq!(calling_code_to_iso("999999"), DEFAULT_COUNTRY);
		assert_eq!(calling_code_to_iso(""), DEFAULT_COUNTRY);
		assert_eq!(calling_code_to_iso("abc"), DEFAULT_COUNTRY);
	}
}
