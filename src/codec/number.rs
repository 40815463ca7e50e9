// file: src/codec/number.rs
// description: lenient numeric scanning and canonical float formatting
// reference: C strtol/strtod prefix rules, printf %g layout

/// C `isspace` in the "C" locale.
fn is_c_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r')
}

fn skip_space(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !is_c_space(*b))
        .unwrap_or(bytes.len());
    &bytes[start..]
}

/// Scan a decimal integer prefix: leading whitespace, an optional sign,
/// then digits up to the first other byte. No digits yields 0.
pub fn scan_integer(bytes: &[u8]) -> i128 {
    let rest = skip_space(bytes);
    let (negative, rest) = match rest.first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };

    let magnitude = rest
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0i128, |acc, b| {
            acc.saturating_mul(10).saturating_add(i128::from(b - b'0'))
        });

    if negative { -magnitude } else { magnitude }
}

/// Length of the longest prefix of `rest` made of ASCII digits.
fn digit_run(rest: &[u8]) -> usize {
    rest.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn starts_with_ignore_case(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.len() >= needle.len() && haystack[..needle.len()].eq_ignore_ascii_case(needle)
}

/// Scan a floating point prefix the way `strtod` does for decimal input.
/// No number yields 0.0.
pub fn scan_float(bytes: &[u8]) -> f64 {
    let rest = skip_space(bytes);
    let mut end = 0;

    if matches!(rest.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let body = &rest[end..];
    for word in [&b"infinity"[..], &b"inf"[..], &b"nan"[..]] {
        if starts_with_ignore_case(body, word) {
            end += word.len();
            return parse_prefix(&rest[..end]);
        }
    }

    let int_digits = digit_run(&rest[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if rest.get(end) == Some(&b'.') {
        frac_digits = digit_run(&rest[end + 1..]);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits + frac_digits == 0 {
        return 0.0;
    }

    if matches!(rest.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(rest.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = digit_run(&rest[exp_end.min(rest.len())..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    parse_prefix(&rest[..end])
}

fn parse_prefix(prefix: &[u8]) -> f64 {
    std::str::from_utf8(prefix)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn strip_fraction_zeros(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

fn non_finite(value: f64) -> Option<String> {
    if value.is_nan() {
        Some("nan".to_string())
    } else if value.is_infinite() {
        Some(if value > 0.0 { "inf" } else { "-inf" }.to_string())
    } else {
        None
    }
}

/// Format like printf `%.{precision}g`: `precision` significant digits,
/// trailing zeros removed, exponent form when the decimal exponent is
/// below -4 or at least `precision`.
pub fn format_general(value: f64, precision: usize) -> String {
    if let Some(text) = non_finite(value) {
        return text;
    }

    let precision = precision.max(1);
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let scientific = format!("{:.*e}", precision - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= precision as i32 {
        format!(
            "{}e{}{:02}",
            strip_fraction_zeros(mantissa),
            if exponent < 0 { '-' } else { '+' },
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        strip_fraction_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

/// Shortest text that parses back to the same `f64`.
pub fn format_shortest(value: f64) -> String {
    if let Some(text) = non_finite(value) {
        return text;
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-5..1e16).contains(&magnitude) {
        format!("{:e}", value)
    } else {
        format!("{}", value)
    }
}

/// Shortest text that parses back to the same `f32`.
pub fn format_shortest_f32(value: f32) -> String {
    if let Some(text) = non_finite(f64::from(value)) {
        return text;
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-5..1e16).contains(&magnitude) {
        format!("{:e}", value)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_integer_prefixes() {
        assert_eq!(scan_integer(b"-123"), -123);
        assert_eq!(scan_integer(b"  42abc"), 42);
        assert_eq!(scan_integer(b"+7"), 7);
        assert_eq!(scan_integer(b"\n\t 9\n"), 9);
        assert_eq!(scan_integer(b"abc"), 0);
        assert_eq!(scan_integer(b""), 0);
        assert_eq!(scan_integer(b"- 5"), 0);
    }

    #[test]
    fn test_scan_integer_saturates() {
        let huge = "9".repeat(60);
        assert_eq!(scan_integer(huge.as_bytes()), i128::MAX);
        let tiny = format!("-{}", huge);
        assert_eq!(scan_integer(tiny.as_bytes()), -i128::MAX);
    }

    #[test]
    fn test_scan_float_prefixes() {
        assert_eq!(scan_float(b"3.25"), 3.25);
        assert_eq!(scan_float(b"  -0.5xyz"), -0.5);
        assert_eq!(scan_float(b"1e3"), 1000.0);
        assert_eq!(scan_float(b"1e"), 1.0);
        assert_eq!(scan_float(b"2.5E-1!"), 0.25);
        assert_eq!(scan_float(b".5"), 0.5);
        assert_eq!(scan_float(b"7."), 7.0);
        assert_eq!(scan_float(b"."), 0.0);
        assert_eq!(scan_float(b"hello"), 0.0);
    }

    #[test]
    fn test_scan_float_special_values() {
        assert_eq!(scan_float(b"inf"), f64::INFINITY);
        assert_eq!(scan_float(b"-Infinity"), f64::NEG_INFINITY);
        assert!(scan_float(b"nan").is_nan());
    }

    #[test]
    fn test_format_general_matches_printf() {
        assert_eq!(format_general(0.1, 15), "0.1");
        assert_eq!(format_general(-123.0, 15), "-123");
        assert_eq!(format_general(1e20, 15), "1e+20");
        assert_eq!(format_general(1.5e-7, 15), "1.5e-07");
        assert_eq!(format_general(0.0001, 15), "0.0001");
        assert_eq!(format_general(4.56789, 3), "4.57");
        assert_eq!(format_general(123456.0, 3), "1.23e+05");
        assert_eq!(format_general(f64::from(0.1f32), 15), "0.100000001490116");
        assert_eq!(format_general(0.0, 15), "0");
    }

    #[test]
    fn test_format_non_finite() {
        assert_eq!(format_general(f64::NAN, 15), "nan");
        assert_eq!(format_general(f64::NEG_INFINITY, 15), "-inf");
        assert_eq!(format_shortest(f64::INFINITY), "inf");
    }

    #[test]
    fn test_format_shortest_round_trips() {
        for value in [0.1, -2.5, 1e20, 6.02214076e23, 1.5e-7, 123456789.125, 0.0] {
            let text = format_shortest(value);
            assert_eq!(scan_float(text.as_bytes()), value, "{}", text);
        }
        assert_eq!(format_shortest(1e20), "1e20");
        assert_eq!(format_shortest(0.1), "0.1");
        assert_eq!(format_shortest_f32(0.1), "0.1");
    }
}
