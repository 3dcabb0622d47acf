//! Human-readable renderings of raw quantities.

use chrono::DateTime;

use crate::model::LatencyStat;

/// Placeholder for any value that is unknown or suppressed.
pub const UNAVAILABLE: &str = "-";

/// Uptime as days+hours, hours+minutes, or minutes.
pub fn format_uptime(seconds: u64) -> String {
    if seconds == 0 {
        return UNAVAILABLE.to_string();
    }
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;

    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Traffic volume in binary units, capped at TB.
pub fn format_traffic(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// SLA fraction as a two-decimal percentage.
pub fn format_sla(fraction: f64) -> String {
    let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
    format!("{:.2}%", fraction * 100.0)
}

/// CPU or memory usage.
pub fn format_usage(percent: f64) -> String {
    format!("{:.1}%", percent)
}

pub fn format_price(cents: i64) -> String {
    format!("¥{:.2}", cents as f64 / 100.0)
}

/// `"{latest} ms · avg {avg} ms"`, each half only when known.
pub fn format_latency(stat: Option<&LatencyStat>) -> String {
    let latest = stat.and_then(|s| s.latest);
    let avg = stat.and_then(|s| s.avg);

    let mut out = match latest {
        Some(v) => format!("{} ms", v),
        None => UNAVAILABLE.to_string(),
    };
    if let Some(avg) = avg {
        out.push_str(&format!(" · avg {} ms", avg));
    }
    out
}

/// Epoch milliseconds as `YYYY-MM-DD HH:MM:SS` (UTC).
pub fn format_timestamp(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| UNAVAILABLE.to_string())
}
