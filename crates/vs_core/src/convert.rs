//! Non-strict parsing of numbers and booleans from text.

use crate::errors::ConversionError;

fn trim(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_ascii_whitespace())
}

fn split_sign(s: &str) -> (bool, &str) {
    match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    }
}

fn hex_digits(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

/// `digits [. digits] [e [sign] digits]` with at least one mantissa digit.
fn is_decimal(s: &[u8]) -> bool {
    let mut i = 0;
    let mut mantissa = 0;
    while i < s.len() && s[i].is_ascii_digit() {
        i += 1;
        mantissa += 1;
    }
    if i < s.len() && s[i] == b'.' {
        i += 1;
        while i < s.len() && s[i].is_ascii_digit() {
            i += 1;
            mantissa += 1;
        }
    }
    if mantissa == 0 {
        return false;
    }
    if i < s.len() && (s[i] == b'e' || s[i] == b'E') {
        i += 1;
        if i < s.len() && (s[i] == b'+' || s[i] == b'-') {
            i += 1;
        }
        let start = i;
        while i < s.len() && s[i].is_ascii_digit() {
            i += 1;
        }
        if i == start {
            return false;
        }
    }
    i == s.len()
}

/// Parses a number, tolerating surrounding whitespace. Empty input is zero.
pub fn parse_number(s: &str) -> Result<f64, ConversionError> {
    let t = trim(s);
    if t.is_empty() {
        return Ok(0.0);
    }
    let (negative, body) = split_sign(t);
    let magnitude = if let Some(hex) = hex_digits(body) {
        u64::from_str_radix(hex, 16).map_err(|_| ConversionError::NotANumber)? as f64
    } else if is_decimal(body.as_bytes()) {
        body.parse::<f64>().map_err(|_| ConversionError::NotANumber)?
    } else {
        return Err(ConversionError::NotANumber);
    };
    Ok(if negative { -magnitude } else { magnitude })
}

/// Parses an integer exactly when the text has no fraction or exponent,
/// otherwise through [`parse_number`] requiring an integral result.
pub fn parse_integer(s: &str) -> Result<i64, ConversionError> {
    let t = trim(s);
    if t.is_empty() {
        return Ok(0);
    }
    let (negative, body) = split_sign(t);
    if !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit()) {
        return t.parse::<i64>().map_err(|_| ConversionError::OutOfRange);
    }
    if let Some(hex) = hex_digits(body) {
        let v = i64::from_str_radix(hex, 16).map_err(|_| ConversionError::NotANumber)?;
        return Ok(if negative { -v } else { v });
    }
    integral(parse_number(t)?)
}

pub fn integral(f: f64) -> Result<i64, ConversionError> {
    if f.fract() != 0.0 || !f.is_finite() {
        return Err(ConversionError::NotAnInteger);
    }
    if f < i64::MIN as f64 || f >= i64::MAX as f64 {
        return Err(ConversionError::OutOfRange);
    }
    Ok(f as i64)
}

pub fn parse_boolean(s: &str) -> Result<bool, ConversionError> {
    if s.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if s.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ConversionError::NotABoolean)
    }
}

/// A key component: ASCII digits only, fitting `u32`.
pub fn parse_index(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
