//! Mobile number normalization.
//!
//! The normalized 10-digit mobile number is the stable lookup key for a
//! member. `+63XXXXXXXXXX`, `0XXXXXXXXXXX` and bare `XXXXXXXXXX` all reduce
//! to the same canonical form.

use crate::{EngineError, ResultEngine};

/// Normalizes a raw mobile number to its canonical 10-digit form.
///
/// Strips every non-digit character, then a leading `63` country code, then a
/// leading `0`, and keeps the last 10 digits. Anything that does not leave
/// exactly 10 digits is rejected.
pub fn normalize_mobile(mobile: &str) -> ResultEngine<String> {
    let mut digits: String = mobile.chars().filter(char::is_ascii_digit).collect();

    if let Some(stripped) = digits.strip_prefix("63") {
        digits = stripped.to_string();
    }
    if let Some(stripped) = digits.strip_prefix('0') {
        digits = stripped.to_string();
    }

    let normalized = if digits.len() > 10 {
        digits[digits.len() - 10..].to_string()
    } else {
        digits
    };

    if normalized.len() != 10 {
        return Err(EngineError::Validation(format!(
            "invalid mobile number: {mobile} (must be 10 digits after normalization)"
        )));
    }

    Ok(normalized)
}
