/// Canonicalize an Argentine WhatsApp sender address.
///
/// Inbound numbers arrive as `549...` (country code plus the mobile `9`
/// insertion), while the delivery API wants `54...`. Drops the marker digit
/// when the `549` prefix is present, otherwise returns the address as-is.
///
/// Must run before the allow-list lookup and before the address is used as
/// a delivery destination.
#[must_use]
pub fn normalize_sender(sender: &str) -> String {
	sender.strip_prefix("549").map_or_else(|| sender.to_owned(), |rest| format!("54{rest}"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_strips_mobile_marker() {
		assert_eq!(normalize_sender("5491155613212"), "541155613212");
	}

	#[test]
	fn test_canonical_address_is_untouched() {
		assert_eq!(normalize_sender("541155613212"), "541155613212");
		assert_eq!(normalize_sender("15555550123"), "15555550123");
	}

	#[test]
	fn test_idempotent_on_canonical_form() {
		let once = normalize_sender("5491155613212");
		assert_eq!(normalize_sender(&once), once);
	}
}
