//! Display formatting in Brazilian notation: `.` groups thousands, `,`
//! separates decimals. Missing or NaN values render as a dash.

pub const MISSING: &str = "—";

/// `R$ 1.234,56`
pub fn currency(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("R$ {}", decimal(v, 2)),
        None => MISSING.to_string(),
    }
}

/// `1.234`
pub fn integer(value: Option<i64>) -> String {
    match value {
        Some(v) => {
            let grouped = group_thousands(&v.unsigned_abs().to_string());
            if v < 0 {
                format!("-{}", grouped)
            } else {
                grouped
            }
        }
        None => MISSING.to_string(),
    }
}

/// A ratio as a percentage: `0.123` → `12,3%`.
pub fn percent(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{:.1}%", v * 100.0).replace('.', ","),
        None => MISSING.to_string(),
    }
}

/// Like [`percent`] but with an explicit sign, for deltas.
pub fn signed_percent(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) if v > 0.0 => format!("+{}", percent(Some(v))),
        other => percent(other),
    }
}

fn decimal(value: f64, places: usize) -> String {
    let fixed = format!("{:.*}", places, value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let sign = if value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        "-"
    } else {
        ""
    };
    if frac_part.is_empty() {
        format!("{}{}", sign, group_thousands(int_part))
    } else {
        format!("{}{},{}", sign, group_thousands(int_part), frac_part)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
