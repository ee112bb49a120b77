//! JavaScript `Number::toString` for radix 10.
//!
//! `ryu` supplies the shortest digit string that round-trips through `f64`;
//! the digits are then laid out the way ECMAScript prints numbers: plain
//! decimal between `1e-6` and `1e21`, exponent form with an explicit sign
//! outside that range.

/// Formats `value` exactly as JavaScript's `String(value)` does.
///
/// # Examples
///
/// ```
/// use core_types::number_to_string;
///
/// assert_eq!(number_to_string(1e21), "1e+21");
/// assert_eq!(number_to_string(1e-7), "1e-7");
/// assert_eq!(number_to_string(123.5), "123.5");
/// assert_eq!(number_to_string(-0.0), "0");
/// ```
pub fn number_to_string(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let mut buffer = ryu::Buffer::new();
    let (digits, point) = decimal_digits(buffer.format_finite(value.abs()));
    let formatted = layout(&digits, point);
    if value < 0.0 {
        format!("-{}", formatted)
    } else {
        formatted
    }
}

/// Splits ryu output such as `"1.5e300"` or `"0.0001"` into significant
/// digits and the position `n` of the decimal point, so that the value is
/// `0.d1d2..dk * 10^n`.
fn decimal_digits(text: &str) -> (String, i32) {
    let (mantissa, exponent) = match text.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (text, 0),
    };
    let (integer, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let all: String = integer.chars().chain(fraction.chars()).collect();
    let leading = all.len() - all.trim_start_matches('0').len();
    let digits = all.trim_start_matches('0').trim_end_matches('0').to_string();
    let point = integer.len() as i32 - leading as i32 + exponent;
    (digits, point)
}

fn layout(digits: &str, point: i32) -> String {
    let k = digits.len() as i32;
    if k <= point && point <= 21 {
        let zeros = "0".repeat((point - k) as usize);
        return format!("{}{}", digits, zeros);
    }
    if 0 < point && point <= 21 {
        let (integer, fraction) = digits.split_at(point as usize);
        return format!("{}.{}", integer, fraction);
    }
    if -6 < point && point <= 0 {
        let zeros = "0".repeat((-point) as usize);
        return format!("0.{}{}", zeros, digits);
    }

    let exponent = point - 1;
    let sign = if exponent >= 0 { '+' } else { '-' };
    let (first, rest) = digits.split_at(1);
    if rest.is_empty() {
        format!("{}e{}{}", first, sign, exponent.abs())
    } else {
        format!("{}.{}e{}{}", first, rest, sign, exponent.abs())
    }
}
