//! Shell quoting

/// Quote a value for POSIX shells.
///
/// Values made only of safe characters are returned as is, everything else is
/// wrapped in single quotes with embedded quotes spliced as `'"'"'`.
pub fn quote(s: &str) -> String {
    if s.is_empty() {
        return "''".to_string();
    }

    if s.chars().all(|c| {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '=' | '/' | '.' | ',' | ':' | '@' | '+')
    }) {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len() + 10);
    result.push('\'');

    for c in s.chars() {
        if c == '\'' {
            result.push_str("'\"'\"'");
        } else {
            result.push(c);
        }
    }

    result.push('\'');
    result
}
