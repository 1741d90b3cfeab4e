/// Format a floating-point number with thousands separators and a fixed
/// number of decimal places.
///
/// # Examples
///
/// ```
/// use schedule_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let abs_value = value.abs();

    let factor = 10_f64.powi(decimals as i32);
    let rounded = (abs_value * factor).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        // `frac_str` starts with "0.", e.g. "0.50". Strip the leading "0".
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a share as a percentage string with one decimal place.
///
/// # Examples
///
/// ```
/// use schedule_core::formatting::format_percent;
///
/// assert_eq!(format_percent(66.666), "66.7%");
/// assert_eq!(format_percent(50.0), "50.0%");
/// ```
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Truncate a course title for axis labels, keeping at most `max` chars.
///
/// Operates on character boundaries, so multi-byte titles never split
/// mid-codepoint.
pub fn truncate_title(title: &str, max: usize) -> String {
    if title.chars().count() <= max {
        title.to_string()
    } else {
        title.chars().take(max).collect()
    }
}

/// Insert `,` separators every three digits from the right.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let chars: Vec<char> = digits.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*c);
    }
    out
}
