//! Number to text and text to number conversions.
//!
//! These work on raw bytes with fixed-size output buffers and no
//! formatting machinery, matching the byte-exact output the stringifier
//! needs on small targets.

use smallvec::SmallVec;

/// Inline buffer for one formatted number. The longest output is
/// `i32::MIN` in base 2 with its sign, 33 bytes.
pub type NumBuf = SmallVec<[u8; 36]>;

/// Fractional digits printed by [`float_to_string`].
pub const FLOAT_PRECISION: usize = 5;

/// Fraction digits folded into a parsed float; later digits are consumed
/// but do not change the value.
const MAX_FRACTION_DIGITS: usize = 18;

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A parsed number and how many input bytes it used.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Parsed<T> {
    /// The parsed value.
    pub value: T,
    /// Bytes consumed from the start of the input.
    pub consumed: usize,
}

/// Format `value` in `base`, using lowercase letters past 9.
///
/// `base` is clamped to `2..=36`.
pub fn int_to_string(value: i32, base: u32) -> NumBuf {
    let mut out = NumBuf::new();
    if value < 0 {
        out.push(b'-');
    }
    push_unsigned(&mut out, value.unsigned_abs(), base.clamp(2, 36));
    out
}

fn push_unsigned(out: &mut NumBuf, mut n: u32, base: u32) {
    let mut digits = [0u8; 32];
    let mut i = digits.len();
    loop {
        i -= 1;
        digits[i] = DIGITS[(n % base) as usize];
        n /= base;
        if n == 0 {
            break;
        }
    }
    out.extend_from_slice(&digits[i..]);
}

/// Parse an optionally signed decimal integer from the start of `bytes`.
///
/// Returns `None` if there are no digits or the value does not fit `i32`.
pub fn string_to_int(bytes: &[u8]) -> Option<Parsed<i32>> {
    let (negative, mut pos) = match bytes.first() {
        Some(b'-') => (true, 1),
        Some(b'+') => (false, 1),
        _ => (false, 0),
    };
    let digits_start = pos;
    let mut magnitude: i64 = 0;
    while let Some(&b) = bytes.get(pos) {
        if !b.is_ascii_digit() {
            break;
        }
        magnitude = magnitude * 10 + i64::from(b - b'0');
        if magnitude > 1 << 31 {
            return None;
        }
        pos += 1;
    }
    if pos == digits_start {
        return None;
    }
    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value).ok().map(|value| Parsed {
        value,
        consumed: pos,
    })
}

/// Format a float by decomposing its IEEE-754 fields.
///
/// Prints the integer part, a `.`, and up to [`FLOAT_PRECISION`]
/// truncated fractional digits with trailing zeros removed (one is
/// always kept). Magnitudes of `2^31` and above print as `Inf`; those
/// below `2^-23` print as `0`; zero prints as `0.0`.
pub fn float_to_string(value: f32) -> NumBuf {
    let mut out = NumBuf::new();
    if value == 0.0 {
        out.extend_from_slice(b"0.0");
        return out;
    }
    let bits = value.to_bits();
    let negative = bits >> 31 != 0;
    let exponent = ((bits >> 23) & 0xFF) as i32 - 127;
    // Restore the implicit leading bit: 1.mmm in 24-bit fixed point.
    let significand = (bits & 0x7F_FFFF) | 0x80_0000;

    let (int_part, mut frac) = if exponent >= 31 {
        out.extend_from_slice(b"Inf");
        return out;
    } else if exponent < -23 {
        out.push(b'0');
        return out;
    } else if exponent >= 23 {
        (significand << (exponent - 23), 0)
    } else if exponent >= 0 {
        (
            significand >> (23 - exponent),
            (significand << (exponent + 1)) & 0xFF_FFFF,
        )
    } else {
        (0, (significand & 0xFF_FFFF) >> -(exponent + 1))
    };

    if negative {
        out.push(b'-');
    }
    push_unsigned(&mut out, int_part, 10);
    out.push(b'.');
    if frac == 0 {
        out.push(b'0');
        return out;
    }
    for _ in 0..FLOAT_PRECISION {
        frac *= 10;
        out.push(b'0' + (frac >> 24) as u8);
        frac &= 0xFF_FFFF;
    }
    while out.last() == Some(&b'0') && out[out.len() - 2] != b'.' {
        out.pop();
    }
    out
}

/// Parse a decimal float from the start of `bytes`: optional sign,
/// integer digits, optional `.` and fraction digits, optional `e`/`E`
/// exponent with its own sign.
///
/// Returns `None` if neither integer nor fraction digits are present. An
/// `e` without exponent digits ends the number before the `e`.
pub fn string_to_float(bytes: &[u8]) -> Option<Parsed<f32>> {
    let (negative, mut pos) = match bytes.first() {
        Some(b'-') => (true, 1),
        Some(b'+') => (false, 1),
        _ => (false, 0),
    };

    let int_start = pos;
    let mut value = 0f64;
    while let Some(d) = digit_at(bytes, pos) {
        value = value * 10.0 + d;
        pos += 1;
    }
    let mut digits = pos - int_start;

    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        let frac_start = pos;
        let (mut frac, mut scale) = (0f64, 1f64);
        while let Some(d) = digit_at(bytes, pos) {
            if pos - frac_start < MAX_FRACTION_DIGITS {
                frac = frac * 10.0 + d;
                scale *= 10.0;
            }
            pos += 1;
        }
        value += frac / scale;
        digits += pos - frac_start;
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        if let Some(exp) = string_to_int(&bytes[pos + 1..]) {
            pos += 1 + exp.consumed;
            if value != 0.0 {
                value *= 10f64.powi(exp.value.clamp(-400, 400));
            }
        }
    }

    let value = if negative { -value } else { value };
    Some(Parsed {
        value: value as f32,
        consumed: pos,
    })
}

#[inline]
fn digit_at(bytes: &[u8], pos: usize) -> Option<f64> {
    bytes
        .get(pos)
        .filter(|b| b.is_ascii_digit())
        .map(|&b| f64::from(b - b'0'))
}
