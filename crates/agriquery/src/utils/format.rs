use crate::models::CellValue;

/// Inserts `,` every three digits of the integer part of a rendered number.
/// Inputs that are not plain decimal numbers are returned unchanged.
#[must_use]
pub fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };
    if integer.is_empty() || !integer.bytes().all(|byte| byte.is_ascii_digit()) {
        return number.to_string();
    }

    let mut grouped = String::with_capacity(number.len() + integer.len() / 3);
    grouped.push_str(sign);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

/// Shortest round-trip rendering of a float, keeping `.0` on integral values.
/// Magnitudes below `1e-4` or at or above `1e16` switch to exponent form with
/// a signed, two-digit minimum exponent (`1e-05`, `1.5e+16`).
#[must_use]
pub fn float_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value.is_sign_negative() { "-inf" } else { "inf" }.to_string();
    }
    let magnitude = value.abs();
    if value != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        return exponent_repr(value);
    }
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

fn exponent_repr(value: f64) -> String {
    let rendered = format!("{value:e}");
    let Some((mantissa, exponent)) = rendered.split_once('e') else {
        return rendered;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

/// Scalar rendering: grouped integers, grouped shortest floats, other values
/// literally.
#[must_use]
pub fn grouped_scalar(value: &CellValue) -> String {
    match value {
        CellValue::Integer(integer) => group_thousands(&integer.to_string()),
        CellValue::Float(float) if float.is_finite() => group_thousands(&float_repr(*float)),
        CellValue::Float(float) => float_repr(*float),
        other => other.to_string(),
    }
}

/// Two-decimal rendering for numeric values, other values literally.
#[must_use]
pub fn grouped_fixed2(value: &CellValue) -> String {
    match value.as_f64() {
        Some(number) if number.is_finite() => group_thousands(&format!("{number:.2}")),
        Some(number) => float_repr(number),
        None => value.to_string(),
    }
}

/// Optional statistic as stored, `n/a` when absent.
#[must_use]
pub fn optional_stat(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), float_repr)
}

#[cfg(test)]
mod tests {
    use super::{float_repr, group_thousands, grouped_fixed2, grouped_scalar, optional_stat};
    use crate::models::CellValue;

    #[test]
    fn groups_integer_part_only() {
        assert_eq!(group_thousands("0"), "0");
        assert_eq!(group_thousands("999"), "999");
        assert_eq!(group_thousands("1000"), "1,000");
        assert_eq!(group_thousands("1234567.891"), "1,234,567.891");
        assert_eq!(group_thousands("-12345.5"), "-12,345.5");
        assert_eq!(group_thousands("inf"), "inf");
    }

    #[test]
    fn float_repr_matches_shortest_round_trip() {
        assert_eq!(float_repr(245.3), "245.3");
        assert_eq!(float_repr(12.0), "12.0");
        assert_eq!(float_repr(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(float_repr(f64::NAN), "nan");
    }

    #[test]
    fn float_repr_switches_to_exponent_outside_plain_range() {
        assert_eq!(float_repr(0.0001), "0.0001");
        assert_eq!(float_repr(0.00001), "1e-05");
        assert_eq!(float_repr(-2.5e-7), "-2.5e-07");
        assert_eq!(float_repr(9_999_999_999_999_998.0), "9999999999999998.0");
        assert_eq!(float_repr(1e16), "1e+16");
        assert_eq!(float_repr(1.5e16), "1.5e+16");
        assert_eq!(float_repr(1e300), "1e+300");
        assert_eq!(float_repr(0.0), "0.0");
        assert_eq!(grouped_scalar(&CellValue::Float(1e16)), "1e+16");
        assert_eq!(optional_stat(Some(0.00001)), "1e-05");
    }

    #[test]
    fn scalar_and_fixed_renderings() {
        assert_eq!(grouped_scalar(&CellValue::Integer(1_523)), "1,523");
        assert_eq!(grouped_scalar(&CellValue::Float(1234.5)), "1,234.5");
        assert_eq!(grouped_scalar(&CellValue::from("8a2a1072b59ffff")), "8a2a1072b59ffff");
        assert_eq!(grouped_scalar(&CellValue::Null), "null");

        assert_eq!(grouped_fixed2(&CellValue::Float(1234.567)), "1,234.57");
        assert_eq!(grouped_fixed2(&CellValue::Integer(1_523)), "1,523.00");
        assert_eq!(grouped_fixed2(&CellValue::Bool(true)), "true");
    }

    #[test]
    fn optional_stat_marks_missing_values() {
        assert_eq!(optional_stat(Some(62.35)), "62.35");
        assert_eq!(optional_stat(Some(180.0)), "180.0");
        assert_eq!(optional_stat(None), "n/a");
    }
}
