/// `$1,234.50`, `$-1,234.50`. Non-finite input renders as `$0.00`.
pub fn format_money(value: f64) -> String {
    if !value.is_finite() {
        return "$0.00".to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits = int_part.as_bytes();
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, d) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(char::from(*d));
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("${sign}{grouped}.{frac_part}")
}

/// Quantities keep a decimal point even when integral (`2.0`, `0.05`).
pub fn format_quantity(qty: f64) -> String {
    if qty.is_finite() && qty.fract() == 0.0 && qty.abs() < 1e16 {
        format!("{qty:.1}")
    } else {
        format!("{qty}")
    }
}
