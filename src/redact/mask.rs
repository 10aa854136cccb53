//! Partial redaction of sensitive values for display

use serde_json::Value;

/// Replaces the hidden middle of a masked value.
pub const MASK_MARKER: &str = "...";

const MAX_REVEAL: usize = 8;

/// Keep `min(len / 8, 8)` characters at each end of `value` and replace the rest
/// with [`MASK_MARKER`].
pub fn mask_str(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let reveal = (chars.len() / 8).min(MAX_REVEAL);
    let head: String = chars[..reveal].iter().collect();
    let tail: String = chars[chars.len() - reveal..].iter().collect();
    format!("{head}{MASK_MARKER}{tail}")
}

/// The form of `value` shown in rendered views. Only strings are ever masked.
pub fn mask_value(value: &Value, masked: bool) -> Value {
    match value {
        Value::String(s) if masked => Value::String(mask_str(s)),
        other => other.clone(),
    }
}
