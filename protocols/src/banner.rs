//! Banner text extraction.

pub const ELLIPSIS: &str = "...";

/// Size of the single read performed when grabbing a banner.
pub const READ_BUFFER_LEN: usize = 1024;

/// Returns the first non-empty line of `raw`, cut to `max_len` characters.
///
/// Invalid UTF-8 is replaced rather than rejected; banners are display text.
/// When the line is longer than `max_len` it is cut and [`ELLIPSIS`] is appended.
pub fn first_line(raw: &[u8], max_len: usize) -> Option<String> {
    let text = String::from_utf8_lossy(raw);
    let line = text.trim().lines().next()?.trim();
    if line.is_empty() {
        return None;
    }
    Some(truncate(line, max_len))
}

pub fn truncate(line: &str, max_len: usize) -> String {
    match line.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &line[..cut]),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_first_line_only() {
        let raw = b"SSH-2.0-OpenSSH_8.9\r\nsecond line\r\n";
        assert_eq!(first_line(raw, 60).as_deref(), Some("SSH-2.0-OpenSSH_8.9"));
    }

    #[test]
    fn skips_leading_whitespace_and_rejects_blank() {
        assert_eq!(first_line(b"\r\n  220 ready\r\n", 60).as_deref(), Some("220 ready"));
        assert_eq!(first_line(b"  \r\n\r\n", 60), None);
        assert_eq!(first_line(b"", 60), None);
    }

    #[test]
    fn long_lines_are_cut_with_ellipsis() {
        let long = "x".repeat(80);
        let line = first_line(long.as_bytes(), 60).unwrap();
        assert_eq!(line.chars().count(), 63);
        assert!(line.ends_with(ELLIPSIS));

        let exact = "y".repeat(60);
        assert_eq!(truncate(&exact, 60), exact);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let cyrillic = "привіт".repeat(20);
        let line = truncate(&cyrillic, 10);
        assert_eq!(line, format!("{}{ELLIPSIS}", "привітприв"));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let raw = [0x32, 0x32, 0x30, 0x20, 0xff, 0xfe];
        let line = first_line(&raw, 60).unwrap();
        assert!(line.starts_with("220 "));
    }
}
