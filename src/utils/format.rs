/// Renders a minute count the way the dashboard does: `0 min`, `45 min`,
/// `2h`, `2h 5min`.
pub fn format_minutes(minutes: u64) -> String {
    if minutes == 0 {
        return "0 min".to_string();
    }
    if minutes >= 60 {
        let hours = minutes / 60;
        let rest = minutes % 60;
        if rest == 0 {
            return format!("{hours}h");
        }
        return format!("{hours}h {rest}min");
    }
    format!("{minutes} min")
}

/// Probability as a percentage clamped to `[0, 100]`, one decimal.
pub fn probability_pct(probability: f64) -> f64 {
    if !probability.is_finite() {
        return 0.0;
    }
    round_one_decimal((probability * 100.0).clamp(0.0, 100.0))
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `part / total` as a percentage with one decimal; `0` when `total` is 0.
pub fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_one_decimal(part as f64 / total as f64 * 100.0)
}

/// First word of a collaborator name, or `fallback` when there is none.
pub fn first_name<'a>(name: &'a str, fallback: &'a str) -> &'a str {
    name.split_whitespace().next().unwrap_or(fallback)
}

/// Strips the domain from email-like names.
pub fn clean_display_name(name: &str) -> String {
    match name.split_once('@') {
        Some((local, _)) => local.to_string(),
        None => name.to_string(),
    }
}
