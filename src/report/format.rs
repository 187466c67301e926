//! Text formatting helpers shared by the report views.

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Format an amount as whole yuan with thousands separators, e.g. `¥3,723,000`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "¥0".to_string();
    }

    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-¥{}", grouped)
    } else {
        format!("¥{}", grouped)
    }
}

/// Format a percentage with one decimal.
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Horizontal bar for a 0-100 share, `width` cells wide.
pub fn share_bar(percentage: f64, width: usize) -> String {
    let fraction = if percentage.is_finite() {
        (percentage / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (fraction * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// One block character per value, scaled between the series min and max.
pub fn sparkline(values: &[f64]) -> String {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let min = finite.clone().fold(f64::INFINITY, f64::min);
    let max = finite.fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    values
        .iter()
        .map(|&value| {
            if !value.is_finite() || range <= 0.0 {
                return SPARK_LEVELS[0];
            }
            let level = ((value - min) / range * (SPARK_LEVELS.len() - 1) as f64).round() as usize;
            SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}

/// Signed currency change, e.g. `+¥5,000`.
pub fn format_change(change: f64) -> String {
    if change > 0.0 {
        format!("+{}", format_currency(change))
    } else {
        format_currency(change)
    }
}

/// Make free text safe inside a Markdown table cell.
///
/// Pipes are escaped and line breaks flattened so one value stays in one cell.
pub fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}
