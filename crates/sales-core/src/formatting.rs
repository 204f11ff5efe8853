/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use sales_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by a relative epsilon so exact binary midpoints round up.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();
    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative && rounded != 0.0 {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a sales amount as whole currency units: `"$1,234"`.
///
/// # Examples
///
/// ```
/// use sales_core::formatting::format_amount;
///
/// assert_eq!(format_amount(1234.56), "$1,235");
/// assert_eq!(format_amount(0.0), "$0");
/// ```
pub fn format_amount(amount: f64) -> String {
    if amount < 0.0 {
        format!("$-{}", format_number(amount.abs(), 0))
    } else {
        format!("${}", format_number(amount, 0))
    }
}

/// Two-significant-figure SI format used inside heatmap cells:
/// `950`, `1.2k`, `35k`, `1.5M`.
pub fn format_compact(value: f64) -> String {
    let abs = value.abs();
    let (scaled, suffix) = if abs >= 1_000_000.0 {
        (value / 1_000_000.0, "M")
    } else if abs >= 1_000.0 {
        (value / 1_000.0, "k")
    } else {
        (value, "")
    };
    let text = if scaled.abs() >= 10.0 {
        format!("{:.0}", scaled)
    } else {
        format!("{:.1}", scaled)
    };
    let text = text.strip_suffix(".0").unwrap_or(&text).to_string();
    format!("{}{}", text, suffix)
}

/// Render a percentage delta with its direction arrow: `"▲ 50.00%"`.
///
/// Zero counts as growth, as in the dashboard's KPI cards.
pub fn format_delta(delta_pct: f64) -> String {
    let arrow = if delta_pct >= 0.0 { '▲' } else { '▼' };
    format!("{} {:.2}%", arrow, delta_pct)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
