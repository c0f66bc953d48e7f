//! Number formatting for terminal output

/// Format with thousands separators, dropping a zero fraction
///
/// `2000000.0` -> `"2,000,000"`, `120.5` -> `"120.5"`
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{:.2}", value.abs());
    let (digits, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');
    let negative = value < 0.0 && (digits != "0" || !fraction.is_empty());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    if negative {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if !fraction.is_empty() {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

/// Amount in dirhams, e.g. `AED 1,250,000`
pub fn format_aed(amount: f64) -> String {
    format!("AED {}", format_number(amount.round()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(500.0), "500");
        assert_eq!(format_number(1000.0), "1,000");
        assert_eq!(format_number(2_000_000.0), "2,000,000");
        assert_eq!(format_number(120.5), "120.5");
        assert_eq!(format_number(1234.56), "1,234.56");
        assert_eq!(format_number(-9876.0), "-9,876");
        assert_eq!(format_number(-0.001), "0");
    }

    #[test]
    fn test_format_number_beyond_u64() {
        assert_eq!(format_number(1e20), "100,000,000,000,000,000,000");
        assert_eq!(format_number(-2.5e19), "-25,000,000,000,000,000,000");
    }

    #[test]
    fn test_format_aed_rounds() {
        assert_eq!(format_aed(700_000.4), "AED 700,000");
        assert_eq!(format_aed(99.5), "AED 100");
    }
}
