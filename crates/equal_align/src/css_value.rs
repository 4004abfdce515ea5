//! Pixel value parsing for resolved computed-style strings.

/// Parse the leading integer of a pixel length such as `"12px"` or `" -3.75px"`.
///
/// Mirrors how engines report padding and border widths: only the integral
/// part is read and any trailing fraction or unit is ignored. Returns `None`
/// when no digit precedes the first non-numeric character, which is the case
/// for empty strings and keywords like `auto`.
pub fn parse_px(value: &str) -> Option<f64> {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .bytes()
        .position(|byte| !byte.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude = digits[..end].parse::<f64>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Format a pixel value for an inline style declaration.
///
/// Whole numbers drop the fractional part (`150px`), fractional values keep
/// their shortest exact representation (`150.5px`).
pub fn format_px(value: f64) -> String {
    format!("{value}px")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_integral_part_only() {
        assert_eq!(parse_px("12px"), Some(12.0));
        assert_eq!(parse_px("12.9px"), Some(12.0));
        assert_eq!(parse_px("  7px"), Some(7.0));
        assert_eq!(parse_px("-4px"), Some(-4.0));
        assert_eq!(parse_px("0"), Some(0.0));
    }

    #[test]
    fn rejects_values_without_leading_digits() {
        assert_eq!(parse_px(""), None);
        assert_eq!(parse_px("auto"), None);
        assert_eq!(parse_px(".5px"), None);
        assert_eq!(parse_px("-"), None);
    }

    #[test]
    fn formats_like_script_number_coercion() {
        assert_eq!(format_px(150.0), "150px");
        assert_eq!(format_px(150.5), "150.5px");
        assert_eq!(format_px(0.0), "0px");
    }
}
