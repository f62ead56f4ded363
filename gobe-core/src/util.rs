//! Small helpers: JSON dumps and random numeric codes.

use rand::Rng;
use serde::Serialize;

/// Largest digit count that still fits in a `u64`.
const MAX_CODE_DIGITS: u32 = 19;

/// Pretty-print any serializable value with one-space indentation.
///
/// Returns an empty string when the value cannot be serialized.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);

    if let Err(err) = value.serialize(&mut ser) {
        tracing::debug!(error = %err, "to_json failed");
        return String::new();
    }
    String::from_utf8(buf).unwrap_or_default()
}

/// Random integer with exactly `digits` decimal digits.
///
/// `digits` is clamped to `1..=19`. A single digit may be `0`; longer codes
/// never start with zero.
pub fn random_code(digits: u32) -> u64 {
    let digits = digits.clamp(1, MAX_CODE_DIGITS);
    if digits == 1 {
        return rand::thread_rng().gen_range(0..=9);
    }
    let low = 10u64.pow(digits - 1);
    let high = low * 10 - 1;
    rand::thread_rng().gen_range(low..=high)
}

/// `len` random decimal digits; leading zeros allowed.
pub fn random_code_string(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
