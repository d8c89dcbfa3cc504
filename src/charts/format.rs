//! Display formatting for change percentages and indicator values.

use crate::data::Change;

const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

/// Signed whole percent with thousands grouping, e.g. `+20%`, `-5%`, `+1,235%`.
pub fn format_change(change: Change) -> String {
    match change {
        Change::Computed(v) => format_percent(v),
        Change::NotComputable => "n/a".to_string(),
    }
}

/// Signed whole percent of a fraction.
pub fn format_percent(fraction: f64) -> String {
    let pct = (fraction * 100.0).round() as i64;
    let sign = if pct < 0 { "-" } else { "+" };
    format!("{}{}%", sign, group_thousands(pct.unsigned_abs()))
}

/// Margins print as plain ratios, everything else as dollars.
pub fn format_value(indicator: &str, value: f64) -> String {
    if indicator.ends_with("Margin") {
        format!("{:.3}", value)
    } else {
        format_dollars(value)
    }
}

/// Dollars with two significant digits and an SI prefix, e.g. `$1.2M`.
pub fn format_dollars(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return "$0.0".to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();

    let exp = abs.log10().floor() as i32;
    let step = 10f64.powi(exp - 1);
    let rounded = (abs / step).round() * step;
    // Rounding may carry into the next power of ten
    let exp = rounded.log10().floor() as i32;

    let k = exp.div_euclid(3).clamp(-8, 8);
    let scaled = rounded / 10f64.powi(3 * k);
    let decimals = (1 - (exp - 3 * k)).max(0) as usize;
    let prefix = SI_PREFIXES[(k + 8) as usize];

    format!("{sign}${scaled:.decimals$}{prefix}")
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
