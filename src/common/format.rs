//! Human-readable formatting for label text

use crate::constants::units::{GB, KB, MB};

/// Format a byte count with binary (1024-based) units.
///
/// Values below 1 KB are printed as a whole number of bytes; larger values
/// use `decimals` fractional digits.
pub fn format_bytes(bytes: u64, decimals: usize) -> String {
    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.*} KB", decimals, bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.*} MB", decimals, bytes as f64 / MB as f64)
    } else {
        format!("{:.*} GB", decimals, bytes as f64 / GB as f64)
    }
}

/// Memory label: `MEM: 42.0% (6.7 GB / 15.5 GB)`
pub fn memory_label(percent: f32, used: u64, total: u64) -> String {
    format!(
        "MEM: {:.1}% ({} / {})",
        percent,
        format_bytes(used, 1),
        format_bytes(total, 1)
    )
}

/// CPU label: `CPU: 12.5%`
pub fn cpu_label(percent: f32) -> String {
    format!("CPU: {:.1}%", percent)
}
