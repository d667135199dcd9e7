//! Base62 alphabet and integer codec used for short codes.

use crate::error::{CoreError, Result};

/// The 62 symbols a short code may contain, in encoding order.
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Number of symbols in [`ALPHABET`].
pub const BASE: u64 = 62;

/// Returns `true` if `c` belongs to the base62 alphabet.
pub fn is_base62(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

/// Returns the symbol at `index` in [`ALPHABET`].
///
/// # Panics
///
/// Panics if `index >= 62`.
pub fn symbol(index: usize) -> char {
    ALPHABET[index] as char
}

/// Encodes an integer as a base62 string (most significant symbol first).
pub fn encode(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut buf = Vec::with_capacity(11);
    while value > 0 {
        buf.push(ALPHABET[(value % BASE) as usize]);
        value /= BASE;
    }
    buf.reverse();

    // every byte comes from ALPHABET, which is ASCII
    buf.into_iter().map(char::from).collect()
}

/// Decodes a base62 string produced by [`encode`].
pub fn decode(encoded: &str) -> Result<u64> {
    if encoded.is_empty() {
        return Err(CoreError::InvalidBase62("empty input".to_string()));
    }

    encoded.chars().try_fold(0u64, |acc, c| {
        let digit = digit_of(c)
            .ok_or_else(|| CoreError::InvalidBase62(format!("invalid character '{c}'")))?;
        acc.checked_mul(BASE)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| CoreError::InvalidBase62(format!("'{encoded}' overflows u64")))
    })
}

fn digit_of(c: char) -> Option<u64> {
    match c {
        '0'..='9' => Some(c as u64 - '0' as u64),
        'A'..='Z' => Some(c as u64 - 'A' as u64 + 10),
        'a'..='z' => Some(c as u64 - 'a' as u64 + 36),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_known_values() {
        assert_eq!(encode(0), "0");
        assert_eq!(encode(61), "z");
        assert_eq!(encode(62), "10");
        assert_eq!(encode(3843), "zz");
    }

    #[test]
    fn decode_known_values() {
        assert_eq!(decode("0").unwrap(), 0);
        assert_eq!(decode("Z").unwrap(), 35);
        assert_eq!(decode("10").unwrap(), 62);
        assert_eq!(decode(&encode(u64::MAX)).unwrap(), u64::MAX);
    }

    #[test]
    fn decode_rejects_foreign_characters() {
        assert!(matches!(decode("ab-c"), Err(CoreError::InvalidBase62(_))));
        assert!(matches!(decode(""), Err(CoreError::InvalidBase62(_))));
    }

    #[test]
    fn decode_rejects_overflow() {
        assert!(decode("zzzzzzzzzzzzz").is_err());
    }

    #[test]
    fn alphabet_matches_predicate() {
        assert!(ALPHABET.iter().all(|b| is_base62(*b as char)));
        assert!(!is_base62('-'));
        assert!(!is_base62('_'));
    }
}
