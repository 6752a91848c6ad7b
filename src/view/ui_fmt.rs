/// Create a bar string with filled and empty blocks
pub fn bar(percent: f64, width: usize) -> String {
    let p = percent.clamp(0.0, 100.0);
    let filled = ((p / 100.0) * width as f64).round() as usize;
    "█".repeat(filled) + &"░".repeat(width.saturating_sub(filled))
}

/// Calculate percentage of a value relative to a total
pub fn percent(value: u64, total: u64) -> f64 {
    if total > 0 {
        value as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

/// Format a count with thousands separators (1234567 -> "1,234,567")
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Average of `total` over `count`, 0 when empty
pub fn average(total: u64, count: u64) -> u64 {
    if count > 0 { total / count } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar() {
        assert_eq!(bar(0.0, 10), "░░░░░░░░░░");
        assert_eq!(bar(100.0, 10), "██████████");
        assert_eq!(bar(50.0, 10), "█████░░░░░");
    }

    #[test]
    fn test_bar_clamp() {
        assert_eq!(bar(-10.0, 10), "░░░░░░░░░░");
        assert_eq!(bar(150.0, 10), "██████████");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(50, 100), 50.0);
        assert_eq!(percent(100, 0), 0.0);
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_average() {
        assert_eq!(average(10, 0), 0);
        assert_eq!(average(10, 4), 2);
    }
}
