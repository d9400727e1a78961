use crate::Error;
use std::str;

/// Headers of a single part, in the order they appeared in the stream.
///
/// Lookups ignore ASCII case, while iteration hands out the names exactly as
/// they were written. Repeated names are all kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartHeaders {
    entries: Vec<(String, String)>,
}

impl PartHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the value of the first header named `name`.
    pub fn get<K: AsRef<str>>(&self, name: K) -> Option<&str> {
        let name = name.as_ref();
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value of headers named `name`, in stream order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key<K: AsRef<str>>(&self, name: K) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn append<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        self.entries.push((name.into(), value.into()));
    }

    /// Parses a header block, i.e. every header line of a part without the
    /// blank line that ends it.
    pub(crate) fn parse(block: &[u8]) -> Result<Self, Error> {
        let mut headers = PartHeaders::new();

        for line in block.split(|b| *b == b'\n') {
            // trim of the last \r
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.is_empty() {
                continue;
            }

            let line = str::from_utf8(line)
                .map_err(|_| Error::malformed("part header line is not valid UTF-8"))?;
            let (name, value) = parse_header_line(line)?;
            headers.append(name, value);
        }

        Ok(headers)
    }
}

fn parse_header_line(s: &str) -> Result<(&str, &str), Error> {
    if s.starts_with(|c: char| c == ' ' || c == '\t') {
        return Err(Error::malformed(format!(
            "continuation header lines are not supported: {:?}",
            s
        )));
    }

    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| Error::malformed(format!("header line without `:`: {:?}", s)))?;

    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(Error::malformed(format!("invalid header name in line: {:?}", s)));
    }

    Ok((name, value.trim()))
}

/// Locates the empty line ending a header block.
///
/// Returns the offset where the empty line starts and the offset right after
/// it. Both `\r\n` and bare `\n` line endings are accepted.
pub(crate) fn find_header_end(raw: &[u8]) -> Option<(usize, usize)> {
    let mut line_start = 0;

    while let Some(i) = raw[line_start..].iter().position(|b| *b == b'\n') {
        let nl = line_start + i;
        let line = &raw[line_start..nl];
        if line.is_empty() || line == b"\r" {
            return Some((line_start, nl + 1));
        }
        line_start = nl + 1;
    }

    None
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_parse_header_lines() {
        let tests = [
            ("Content-Type: image/jpeg", "Content-Type", "image/jpeg"),
            ("Content-Length: 40669", "Content-Length", "40669"),
            (
                "X-Timestamp: 1550567095.266",
                "X-Timestamp",
                "1550567095.266",
            ),
            ("X-TimeDiff:173 ", "X-TimeDiff", "173"),
            ("Location: http://host:8080/a", "Location", "http://host:8080/a"),
            ("X-Empty:", "X-Empty", ""),
        ];

        for (header, exp_name, exp_val) in &tests {
            let (name, val) = parse_header_line(header).expect("Parse header line");

            assert_eq!(exp_name, &name);
            assert_eq!(exp_val, &val);
        }
    }

    #[test]
    fn rejects_bad_header_lines() {
        for line in &["no colon here", ": value", "Bad Name: v", " folded: value", "\tfolded"] {
            match parse_header_line(line) {
                Err(Error::MalformedStream(_)) => {}
                other => panic!("expected MalformedStream for {:?}, got {:?}", line, other),
            }
        }
    }

    #[test]
    fn lookup_ignores_case_and_keeps_order() {
        let block = b"content-type: text/plain\r\nX-Tag: one\r\nx-tag: two\r\n";
        let headers = PartHeaders::parse(block).expect("parse block");

        assert_eq!(3, headers.len());
        assert_eq!(Some("text/plain"), headers.get("Content-Type"));
        assert_eq!(Some("one"), headers.get("X-TAG"));
        assert_eq!(vec!["one", "two"], headers.get_all("x-tag").collect::<Vec<_>>());
        assert!(!headers.contains_key("content-length"));

        let names: Vec<&str> = headers.iter().map(|(k, _)| k).collect();
        assert_eq!(vec!["content-type", "X-Tag", "x-tag"], names);
    }

    #[test]
    fn parse_lf_only_block() {
        let headers = PartHeaders::parse(b"A: 1\nB: 2\n").expect("parse block");
        assert_eq!(Some("1"), headers.get("a"));
        assert_eq!(Some("2"), headers.get("b"));
    }

    #[test]
    fn parse_rejects_non_utf8() {
        assert!(PartHeaders::parse(b"A: \xff\xfe\r\n").is_err());
    }

    #[test]
    fn header_end_positions() {
        assert_eq!(Some((0, 2)), find_header_end(b"\r\nbody"));
        assert_eq!(Some((0, 1)), find_header_end(b"\nbody"));
        assert_eq!(Some((6, 8)), find_header_end(b"A: b\r\n\r\nbody"));
        assert_eq!(Some((5, 6)), find_header_end(b"A: b\n\nbody"));
        assert_eq!(Some((6, 7)), find_header_end(b"A: b\r\n\nbody"));
        assert_eq!(None, find_header_end(b"A: b\r\nC: d"));
        assert_eq!(None, find_header_end(b"A: b\r\n"));
        assert_eq!(None, find_header_end(b""));
    }
}
