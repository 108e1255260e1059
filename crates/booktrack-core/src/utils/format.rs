/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Truncate or pad with spaces to exactly `width` characters, for table columns
pub fn pad_right(s: &str, width: usize) -> String {
    let cell = truncate(s, width);
    let len = cell.chars().count();
    format!("{}{}", cell, " ".repeat(width - len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hi", 2), "Hi");
        assert_eq!(truncate("Hello", 2), "He");
        // Counts characters, not bytes
        assert_eq!(truncate("Café au lait", 7), "Café...");
    }

    #[test]
    fn test_pad_right() {
        assert_eq!(pad_right("Dune", 6), "Dune  ");
        assert_eq!(pad_right("The Left Hand of Darkness", 10), "The Lef...");
        assert_eq!(pad_right("", 3), "   ");
    }
}
