//! Cookie file parsing for authenticated provider requests.
//!
//! Accepts Netscape cookie-jar lines (7+ TAB-separated fields) and loose
//! `name=value` lines in the same file, and flattens them into a single
//! `Cookie` request-header value. Collection is best-effort: malformed
//! lines are skipped silently so a half-exported browser file still yields
//! whatever usable pairs it contains.

use std::fmt;
use std::io::BufRead;
use std::path::Path;

use tracing::{debug, instrument};

/// A single collected cookie pair.
///
/// The value is redacted in Debug output to prevent accidental logging of
/// sensitive session material.
#[derive(Clone, PartialEq, Eq)]
pub struct CookiePair {
    /// Cookie name.
    pub name: String,
    /// Cookie value (sensitive — never log).
    value: String,
}

impl CookiePair {
    /// Creates a new cookie pair.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns the cookie value.
    ///
    /// Cookie values are sensitive — avoid logging the return value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    fn header_fragment(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

// Custom Debug impl that redacts the cookie value.
impl fmt::Debug for CookiePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookiePair")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Errors that can occur while reading a cookie file.
#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    /// I/O error reading the cookie file.
    #[error("failed to read cookie file: {0}")]
    Io(#[from] std::io::Error),
}

/// Parses cookie pairs from a buffered reader.
///
/// Per line: blanks and `#` comments are skipped; a line containing a TAB
/// is treated as Netscape format (7+ fields, the 6th and 7th being name and
/// value, both required non-empty); a TAB-less line containing `=` is a
/// literal pair with any trailing `;` stripped. Everything else is ignored.
///
/// # Errors
///
/// Returns [`CookieError::Io`] on read failure only; malformed lines never
/// error.
#[instrument(level = "debug", skip(reader))]
pub fn parse_cookie_pairs(reader: impl BufRead) -> Result<Vec<CookiePair>, CookieError> {
    let mut pairs = Vec::new();

    for line_result in reader.lines() {
        let line = line_result?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.contains('\t') {
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() >= 7 {
                let name = fields[5];
                let value = fields[6];
                if !name.is_empty() && !value.is_empty() {
                    pairs.push(CookiePair::new(name, value));
                }
            }
            continue;
        }

        if let Some((name, value)) = line.strip_suffix(';').unwrap_or(line).split_once('=') {
            pairs.push(CookiePair::new(name, value));
        }
    }

    debug!(cookies = pairs.len(), "collected cookie pairs");
    Ok(pairs)
}

/// Joins collected pairs into a `Cookie` header value.
#[must_use]
pub fn to_cookie_header(pairs: &[CookiePair]) -> String {
    pairs
        .iter()
        .map(CookiePair::header_fragment)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Builds a `Cookie` header value from a cookie file path.
///
/// An empty or non-existent path yields an empty header without error; an
/// existing but unreadable file is an I/O error so the caller can surface
/// an environment-level failure.
///
/// # Errors
///
/// Returns [`CookieError::Io`] when an existing file cannot be read.
pub fn cookie_header_from_file(path: &Path) -> Result<String, CookieError> {
    if path.as_os_str().is_empty() || !path.exists() {
        return Ok(String::new());
    }
    let file = std::fs::File::open(path)?;
    let pairs = parse_cookie_pairs(std::io::BufReader::new(file))?;
    Ok(to_cookie_header(&pairs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;

    fn cursor(s: &str) -> Cursor<&[u8]> {
        Cursor::new(s.as_bytes())
    }

    fn header_of(input: &str) -> String {
        to_cookie_header(&parse_cookie_pairs(cursor(input)).unwrap())
    }

    #[test]
    fn test_netscape_line_parses_name_value() {
        let header = header_of("example.com\tTRUE\t/\tFALSE\t0\tSID\tabc123\n");
        assert_eq!(header, "SID=abc123");
    }

    #[test]
    fn test_literal_pair_strips_trailing_semicolon() {
        assert_eq!(header_of("foo=bar;\n"), "foo=bar");
        assert_eq!(header_of("foo=bar\n"), "foo=bar");
    }

    #[test]
    fn test_comments_and_blanks_contribute_nothing() {
        let input = "\
# Netscape HTTP Cookie File
# comment

";
        assert_eq!(header_of(input), "");
    }

    #[test]
    fn test_mixed_formats_join_in_order() {
        let input = "\
# header
example.com\tTRUE\t/\tFALSE\t0\tSID\tabc123
theme=dark;
.example.com\tTRUE\t/\tTRUE\t1700000000\tHSID\txyz
";
        assert_eq!(header_of(input), "SID=abc123; theme=dark; HSID=xyz");
    }

    #[test]
    fn test_short_tab_line_is_skipped() {
        // Six fields: no value column, ignored without error.
        let input = "example.com\tTRUE\t/\tFALSE\t0\tSID\ngood=pair\n";
        assert_eq!(header_of(input), "good=pair");
    }

    #[test]
    fn test_netscape_empty_name_or_value_is_skipped() {
        let input = "\
example.com\tTRUE\t/\tFALSE\t0\t\tvalue
example.com\tTRUE\t/\tFALSE\t0\tname\t
";
        assert_eq!(header_of(input), "");
    }

    #[test]
    fn test_line_without_separator_is_ignored() {
        assert_eq!(header_of("garbage line\nok=1\n"), "ok=1");
    }

    #[test]
    fn test_literal_pair_value_may_contain_equals() {
        assert_eq!(header_of("token=a=b=c;\n"), "token=a=b=c");
    }

    #[test]
    fn test_crlf_line_endings() {
        let header = header_of("example.com\tTRUE\t/\tFALSE\t0\tSID\tabc123\r\nfoo=bar;\r\n");
        assert_eq!(header, "SID=abc123; foo=bar");
    }

    #[test]
    fn test_extra_netscape_fields_keep_positional_name_value() {
        // Eight fields: name/value stay the 6th and 7th columns.
        let input = "example.com\tTRUE\t/\tFALSE\t0\tSID\tabc123\textra\n";
        assert_eq!(header_of(input), "SID=abc123");
    }

    #[test]
    fn test_cookie_pair_debug_redacts_value() {
        let pair = CookiePair::new("session", "super_secret_token");
        let debug_str = format!("{pair:?}");
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("super_secret_token"));
    }

    #[test]
    fn test_missing_path_yields_empty_header() {
        let header = cookie_header_from_file(Path::new("/nonexistent/cookies.txt")).unwrap();
        assert_eq!(header, "");
    }

    #[test]
    fn test_empty_path_yields_empty_header() {
        let header = cookie_header_from_file(Path::new("")).unwrap();
        assert_eq!(header, "");
    }

    #[test]
    fn test_header_from_real_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# exported cookies").unwrap();
        writeln!(file, "example.com\tTRUE\t/\tFALSE\t0\tSID\tabc123").unwrap();
        writeln!(file, "foo=bar;").unwrap();
        let header = cookie_header_from_file(file.path()).unwrap();
        assert_eq!(header, "SID=abc123; foo=bar");
    }
}
