use unicode_width::UnicodeWidthStr;

use crate::engine::LessonStatus;

/// Create a simple ASCII progress bar
pub fn progress_bar(filled: u32, total: u32, width: usize) -> String {
    if total == 0 {
        return "░".repeat(width);
    }
    let ratio = (filled as f64 / total as f64).min(1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

/// Right-pad to a display width. Cyrillic and emoji make byte length useless
/// for column alignment.
pub fn pad_display(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    format!("{}{}", text, " ".repeat(width.saturating_sub(used)))
}

pub fn format_streak(days: u32) -> String {
    match days {
        1 => "1 day".to_string(),
        n => format!("{} days", n),
    }
}

pub fn status_marker(status: LessonStatus) -> &'static str {
    match status {
        LessonStatus::Completed => "✓",
        LessonStatus::Current => "▶",
        LessonStatus::Available => "·",
        LessonStatus::Locked => "🔒",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(1, 3, 6), "██░░░░");
        assert_eq!(progress_bar(5, 3, 4), "████");
        assert_eq!(progress_bar(0, 0, 3), "░░░");
    }

    #[test]
    fn pad_display_counts_columns_not_bytes() {
        let padded = pad_display("Урок", 6);
        assert_eq!(UnicodeWidthStr::width(padded.as_str()), 6);
        assert_eq!(pad_display("toolong", 3), "toolong");
    }

    #[test]
    fn streak_pluralises() {
        assert_eq!(format_streak(1), "1 day");
        assert_eq!(format_streak(0), "0 days");
        assert_eq!(format_streak(12), "12 days");
    }
}
