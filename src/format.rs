const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Wire marker for a reading the platform cannot provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// Render a byte count as `"<value> <unit>"` with two decimals, stepping by
/// 1024 from B up to PB. Values beyond PB stay in PB.
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in UNITS {
        if value < 1024.0 {
            return format!("{value:.2} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.2} PB")
}

pub fn round_1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
