use serde::{Deserialize, Deserializer};

/// Falls back to `T::default()` instead of failing the whole document.
pub fn ok_or_default<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: Deserialize<'de> + Default,
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Rounds to a whole number and groups thousands, e.g. `1234567.4` -> `1,234,567`.
pub fn format_value(value: f64) -> String {
    if !value.is_finite() {
        return String::from("-");
    }

    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Compact axis label: `950`, `12.5K`, `3.2M`, `1.1B`.
pub fn abbr_large_numbers(value: f64) -> String {
    let abs = value.abs();

    let (scaled, suffix) = if abs >= 1_000_000_000.0 {
        (value / 1_000_000_000.0, "B")
    } else if abs >= 1_000_000.0 {
        (value / 1_000_000.0, "M")
    } else if abs >= 1_000.0 {
        (value / 1_000.0, "K")
    } else {
        return format!("{}", value.round() as i64);
    };

    let text = format!("{scaled:.1}");
    match text.strip_suffix(".0") {
        Some(whole) => format!("{whole}{suffix}"),
        None => format!("{text}{suffix}"),
    }
}
