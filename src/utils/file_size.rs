const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

pub struct FileSizeUtils;

impl FileSizeUtils {
    /// Size in binary megabytes, rounded to two decimals.
    pub fn size_in_mb(size: u64) -> f64 {
        (size as f64 / BYTES_PER_MB * 100.0).round() / 100.0
    }

    pub fn format_size(size: u64) -> String {
        const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
        let mut value = size as f64;
        let mut unit = 0;

        while value >= 1024.0 && unit < UNITS.len() - 1 {
            value /= 1024.0;
            unit += 1;
        }

        match unit {
            0 => format!("{} {}", size, UNITS[0]),
            _ => format!("{:.2} {}", value, UNITS[unit]),
        }
    }
}
