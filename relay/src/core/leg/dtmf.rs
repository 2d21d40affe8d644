//! DTMF digit helpers.

/// Default digit that ends a relay session when pressed by the caller.
pub const DEFAULT_HANGUP_DIGIT: char = '#';

/// Normalize a DTMF digit, returning `None` when the character is not one of
/// `0-9`, `*`, `#` or `A-D`.
pub fn normalize_digit(c: char) -> Option<char> {
    match c {
        '0'..='9' | '*' | '#' => Some(c),
        'A'..='D' => Some(c),
        'a'..='d' => Some(c.to_ascii_uppercase()),
        _ => None,
    }
}

/// Parse a configured hang-up digit. The value must be exactly one DTMF
/// character.
pub fn parse_digit(value: &str) -> Option<char> {
    let mut chars = value.trim().chars();
    let digit = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    normalize_digit(digit)
}
