//! Shared numeric grammar for post-count text.
//!
//! Accepts digits with optional thousands separators, an optional decimal
//! point, and an optional single-letter magnitude suffix (K/M/B,
//! case-insensitive, multiplying by 1e3/1e6/1e9). Results are floored to an
//! integer. The same grammar serves the `<strong>`-text strategy and the
//! whole-document scan.

/// Parse a token like `"1.2K"`, `"5,432"`, or `"3M"` into a post count.
///
/// Returns `None` when the token holds no digits or the value is negative.
#[must_use]
pub fn parse_magnitude(token: &str) -> Option<u64> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (number_part, multiplier) = match trimmed.chars().last() {
        Some('k' | 'K') => (&trimmed[..trimmed.len() - 1], 1_000_f64),
        Some('m' | 'M') => (&trimmed[..trimmed.len() - 1], 1_000_000_f64),
        Some('b' | 'B') => (&trimmed[..trimmed.len() - 1], 1_000_000_000_f64),
        _ => (trimmed, 1_f64),
    };

    let cleaned: String = number_part.chars().filter(|&c| c != ',').collect();
    if cleaned.is_empty() || !cleaned.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }

    let value = cleaned.parse::<f64>().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some((value * multiplier).floor() as u64)
}

/// Extract the first comma-grouped digit run from free text and parse it as
/// a plain integer (`"5,432 posts today"` → 5432). Used by the structural
/// and attribute strategies, which trust their element to hold a bare count.
#[must_use]
pub fn first_digit_run(text: &str) -> Option<u64> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(u8::is_ascii_digit)?;
    let end = bytes[start..]
        .iter()
        .position(|&b| !(b.is_ascii_digit() || b == b','))
        .map_or(bytes.len(), |i| start + i);

    let cleaned: String = text[start..end].chars().filter(|&c| c != ',').collect();
    cleaned.parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_magnitude_suffixes() {
        assert_eq!(parse_magnitude("1.2K"), Some(1_200));
        assert_eq!(parse_magnitude("3M"), Some(3_000_000));
        assert_eq!(parse_magnitude("2b"), Some(2_000_000_000));
        assert_eq!(parse_magnitude("1.5m"), Some(1_500_000));
    }

    #[test]
    fn parses_comma_grouped_plain_numbers() {
        assert_eq!(parse_magnitude("5,432"), Some(5_432));
        assert_eq!(parse_magnitude("1,234,567"), Some(1_234_567));
        assert_eq!(parse_magnitude("42"), Some(42));
    }

    #[test]
    fn floors_fractional_results() {
        assert_eq!(parse_magnitude("1.2345K"), Some(1_234));
    }

    #[test]
    fn rejects_non_numeric_tokens() {
        assert_eq!(parse_magnitude("posts"), None);
        assert_eq!(parse_magnitude(""), None);
        assert_eq!(parse_magnitude("K"), None);
        assert_eq!(parse_magnitude("1.2.3"), None);
    }

    #[test]
    fn first_digit_run_finds_leading_count() {
        assert_eq!(first_digit_run("5,432 posts today"), Some(5_432));
        assert_eq!(first_digit_run("about 900 uses"), Some(900));
        assert_eq!(first_digit_run("no numbers here"), None);
    }
}
