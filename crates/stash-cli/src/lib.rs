use stash_storage::ObjectEntry;

/// Render a byte count with a binary unit suffix.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// One line per listing entry: timestamp, size, key.
pub fn format_entry(entry: &ObjectEntry) -> String {
    format!(
        "{}  {:>10}  {}",
        entry.last_modified.format("%Y-%m-%d %H:%M:%S"),
        format_size(entry.size),
        entry.key
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn format_size_bytes() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
    }

    #[test]
    fn format_size_scaled() {
        assert_eq!(format_size(1024), "1.0 KiB");
        assert_eq!(format_size(1536), "1.5 KiB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MiB");
    }

    #[test]
    fn format_entry_line() {
        let entry = ObjectEntry {
            key: "images/logo.png".to_string(),
            size: 2048,
            last_modified: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
            e_tag: None,
        };
        assert_eq!(
            format_entry(&entry),
            "2024-03-01 12:30:00     2.0 KiB  images/logo.png"
        );
    }
}

/// Initialize tracing for CLI binaries.
///
/// Logs go to stderr so object bodies written to stdout stay clean.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
