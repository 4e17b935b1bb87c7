use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Canonical time-span text: `[-][d.]hh:mm:ss[.fffffff]`.
pub fn format_time_span(span: Duration, negative: bool) -> String {
    let total = span.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    // seven fractional digits, 100ns ticks
    let ticks = span.subsec_nanos() / 100;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if days > 0 {
        out.push_str(&format!("{}.", days));
    }
    out.push_str(&format!("{:02}:{:02}:{:02}", hours, minutes, seconds));
    if ticks > 0 {
        out.push_str(&format!(".{:07}", ticks));
    }
    out
}

/// Expand "~/" and resolve relative paths against base_dir.
pub fn resolve_path(raw_path: &str, base_dir: &Path) -> PathBuf {
    let mut p = match raw_path.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(raw_path),
        },
        None => PathBuf::from(raw_path),
    };

    if p.is_relative() {
        p = base_dir.join(p);
    }
    p
}

/// Read a UTF-8 text file, dropping a leading byte-order mark.
pub fn read_text(path: &Path) -> std::io::Result<String> {
    let content = fs::read_to_string(path)?;
    Ok(match content.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_span_forms() {
        assert_eq!(format_time_span(Duration::from_secs(0), false), "00:00:00");
        assert_eq!(format_time_span(Duration::from_secs(3_725), false), "01:02:05");
        assert_eq!(format_time_span(Duration::from_secs(2 * 86_400 + 5), true), "-2.00:00:05");
        assert_eq!(format_time_span(Duration::from_millis(1_500), false), "00:00:01.5000000");
    }

    #[test]
    fn test_resolve_path() {
        let base = Path::new("/work");
        assert_eq!(resolve_path("out/a.txt", base), PathBuf::from("/work/out/a.txt"));
        assert_eq!(resolve_path("/abs/b.txt", base), PathBuf::from("/abs/b.txt"));
    }

    #[test]
    fn test_read_text_strips_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.tpl");
        fs::write(&path, "\u{feff}Hello").unwrap();
        assert_eq!(read_text(&path).unwrap(), "Hello");
    }
}
