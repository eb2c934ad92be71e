use std::io::{self, Write};
use crossterm::{queue, style::{Color, SetForegroundColor, SetBackgroundColor, ResetColor, Attribute, SetAttribute}};

/// Truncate a string to at most `max_len` characters (not bytes), appending "..."
/// if truncated. Safe for multi-byte UTF-8.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else {
        let keep = max_len.saturating_sub(3);
        let truncated: String = s.chars().take(keep).collect();
        format!("{}...", truncated)
    }
}

pub fn writeln(out: &mut impl Write, text: &str) -> io::Result<()> {
    write!(out, "{}\r\n", text)
}

pub fn write_section_header(out: &mut impl Write, text: &str, selected: bool) -> io::Result<()> {
    if selected {
        queue!(io::stdout(), SetBackgroundColor(Color::DarkBlue), SetForegroundColor(Color::White))?;
    } else {
        queue!(io::stdout(), SetAttribute(Attribute::Bold))?;
    }
    write!(out, "{}\r\n", text)?;
    queue!(io::stdout(), ResetColor, SetAttribute(Attribute::Reset))?;
    Ok(())
}

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count into a human-readable string, e.g. 1536 -> "1.5 KB".
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
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

/// Format milliseconds into a human-readable duration, e.g. 125000 -> "2m 5s".
pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        return format!("{}ms", ms);
    }
    let secs = ms / 1000;
    if secs < 60 {
        return format!("{}s", secs);
    }
    let minutes = secs / 60;
    let remain_secs = secs % 60;
    if minutes < 60 {
        return if remain_secs > 0 {
            format!("{}m {}s", minutes, remain_secs)
        } else {
            format!("{}m", minutes)
        };
    }
    let hours = minutes / 60;
    let remain_min = minutes % 60;
    if remain_min > 0 {
        format!("{}h {}m", hours, remain_min)
    } else {
        format!("{}h", hours)
    }
}

pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Utilization color thresholds: green below 70%, amber to 90%, red above.
pub fn utilization_color(percent: f64) -> Color {
    if percent > 90.0 {
        Color::Red
    } else if percent > 70.0 {
        Color::Yellow
    } else {
        Color::Green
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_str_short_string() {
        assert_eq!(truncate_str("hello", 10), "hello");
    }

    #[test]
    fn truncate_str_long_string() {
        assert_eq!(truncate_str("hello world", 8), "hello...");
    }

    #[test]
    fn truncate_str_utf8() {
        assert_eq!(truncate_str("café", 4), "café");
        assert_eq!(truncate_str("hello世界", 6), "hel..."); // 7 chars, keep=3
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.0 GB");
    }

    #[test]
    fn format_duration_ranges() {
        assert_eq!(format_duration(500), "500ms");
        assert_eq!(format_duration(9_000), "9s");
        assert_eq!(format_duration(125_000), "2m 5s");
        assert_eq!(format_duration(120_000), "2m");
        assert_eq!(format_duration(3_660_000), "1h 1m");
        assert_eq!(format_duration(7_200_000), "2h");
    }

    #[test]
    fn progress_bar_empty() {
        assert_eq!(progress_bar(0.0, 10), "[░░░░░░░░░░]");
    }

    #[test]
    fn progress_bar_full() {
        assert_eq!(progress_bar(100.0, 5), "[█████]");
    }

    #[test]
    fn progress_bar_clamps_overflow() {
        assert_eq!(progress_bar(140.0, 5), "[█████]");
    }

    #[test]
    fn utilization_thresholds() {
        assert_eq!(utilization_color(50.0), Color::Green);
        assert_eq!(utilization_color(80.0), Color::Yellow);
        assert_eq!(utilization_color(95.0), Color::Red);
    }
}
