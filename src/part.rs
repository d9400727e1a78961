use crate::{
    headers::{find_header_end, PartHeaders},
    Error,
};
use bytes::{Buf, Bytes};

/// One part of a multipart stream, detached from the reader's buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    headers: PartHeaders,
    body_data: Bytes,
    is_last: bool,
}

impl Part {
    /// Splits the raw content of a part, everything between two delimiter
    /// lines, into its header block and body.
    pub(crate) fn parse(
        mut bs: Bytes,
        is_last: bool,
        max_header_size: usize,
    ) -> Result<Self, Error> {
        let (header_end, body_start) = match find_header_end(&bs) {
            Some(split) => split,
            // The blank line is shared with the line break before the next boundary.
            None if bs.is_empty() || bs.ends_with(b"\n") => (bs.len(), bs.len()),
            None => {
                return Err(Error::malformed(
                    "part header block is not terminated by a blank line",
                ))
            }
        };

        if body_start > max_header_size {
            return Err(Error::malformed(format!(
                "part header block exceeds {} bytes",
                max_header_size
            )));
        }

        let headers = PartHeaders::parse(&bs[..header_end])?;
        bs.advance(body_start);

        Ok(Part {
            headers,
            body_data: bs,
            is_last,
        })
    }

    pub fn headers(&self) -> &PartHeaders {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body_data
    }

    pub fn into_body(self) -> Bytes {
        self.body_data
    }

    pub fn body_len(&self) -> usize {
        self.body_data.len()
    }

    /// True when the terminating boundary directly follows this part.
    pub fn is_last(&self) -> bool {
        self.is_last
    }

    pub fn into_parts(self) -> (PartHeaders, Bytes) {
        (self.headers, self.body_data)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    const LIMIT: usize = 8 * 1024;

    #[test]
    fn split_headers_and_body() {
        let raw = Bytes::from_static(b"Content-Type: text/plain\r\nX-Id: 7\r\n\r\nhello\r\nworld");
        let part = Part::parse(raw, false, LIMIT).expect("parse part");

        assert_eq!(Some("text/plain"), part.headers().get("content-type"));
        assert_eq!(Some("7"), part.headers().get("x-id"));
        assert_eq!(b"hello\r\nworld", part.body());
        assert_eq!(12, part.body_len());
        assert!(!part.is_last());
    }

    #[test]
    fn part_without_headers() {
        let part = Part::parse(Bytes::from_static(b"\r\nPart1"), true, LIMIT).expect("parse part");

        assert!(part.headers().is_empty());
        assert_eq!(b"Part1", part.body());
        assert!(part.is_last());
    }

    #[test]
    fn empty_body_after_blank_line() {
        let raw = Bytes::from_static(b"A: b\r\n\r\n");
        let part = Part::parse(raw, false, LIMIT).expect("parse part");
        assert_eq!(Some("b"), part.headers().get("a"));
        assert!(part.body().is_empty());
    }

    #[test]
    fn blank_line_shared_with_delimiter() {
        let part = Part::parse(Bytes::from_static(b"A: b\r\n"), false, LIMIT).expect("parse part");
        assert_eq!(Some("b"), part.headers().get("a"));
        assert_eq!(0, part.body_len());

        let part = Part::parse(Bytes::new(), false, LIMIT).expect("parse empty part");
        assert!(part.headers().is_empty());
        assert_eq!(0, part.body_len());
    }

    #[test]
    fn unterminated_header_block() {
        match Part::parse(Bytes::from_static(b"A: b\r\nC: d"), false, LIMIT) {
            Err(Error::MalformedStream(_)) => {}
            other => panic!("expected MalformedStream, got {:?}", other),
        }
    }

    #[test]
    fn header_block_over_limit() {
        let raw = Bytes::from_static(b"X-Long: aaaaaaaaaaaaaaaa\r\n\r\nbody");
        assert!(Part::parse(raw, false, 16).is_err());
    }

    #[test]
    fn into_parts_keeps_body_bytes() {
        let raw = Bytes::from_static(b"A: b\n\nbinary\x00\xff");
        let (headers, body) = Part::parse(raw, false, LIMIT).expect("parse part").into_parts();
        assert_eq!(Some("b"), headers.get("A"));
        assert_eq!(&b"binary\x00\xff"[..], &body[..]);
    }
}
