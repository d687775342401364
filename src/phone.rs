//! Phone number helpers.
//!
//! Targets are tracked as bare digit strings. The gateway reports senders in
//! E.164 form (`+15551234567`), so lookups strip the North American `+1`
//! prefix before comparing.

/// Country-code prefix stripped during normalization.
const COUNTRY_PREFIX: &str = "+1";

/// Strips a leading `+1` from `number`, leaving anything else untouched.
#[must_use]
pub fn normalize(number: &str) -> &str {
    number.strip_prefix(COUNTRY_PREFIX).unwrap_or(number)
}

/// Returns `true` when `target` is non-empty and made only of ASCII digits.
#[must_use]
pub fn is_valid_target(target: &str) -> bool {
    !target.is_empty() && target.bytes().all(|b| b.is_ascii_digit())
}
