use crate::{headers::find_header_end, Error, ReaderConfig};
use bytes::{Buf, Bytes, BytesMut};

#[derive(Debug)]
pub(crate) enum ParseResult {
    Done,
    NotReady,
    Ready(RawPart),
    Err(Error),
}

/// The unparsed content of one part: header block, blank line and body.
#[derive(Debug, PartialEq)]
pub(crate) struct RawPart {
    pub bytes: Bytes,
    pub is_last: bool,
}

#[cfg(test)]
impl std::cmp::PartialEq for ParseResult {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParseResult::Done, ParseResult::Done) => true,
            (ParseResult::NotReady, ParseResult::NotReady) => true,
            (ParseResult::Err(_), ParseResult::Err(_)) => false,
            (ParseResult::Ready(ref part), ParseResult::Ready(ref other_part)) => {
                part == other_part
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Looking for the first boundary. It may sit anywhere, line break or not.
    Preamble,
    /// Buffering a part until a line break followed by the boundary shows up.
    Part,
    Done,
}

/// What follows the `--boundary` marker bytes.
#[derive(Debug, PartialEq)]
enum Suffix {
    NeedMore,
    /// `--`, the terminating boundary.
    Final,
    /// Optional padding plus a line break; holds the number of bytes to skip.
    Line(usize),
    Invalid,
}

fn delimiter_suffix(tail: &[u8]) -> Suffix {
    const BOUNDARY_LAST_PART_SENTINEL: &[u8] = b"--";

    if tail.starts_with(BOUNDARY_LAST_PART_SENTINEL) {
        return Suffix::Final;
    }
    if tail == b"-" {
        return Suffix::NeedMore;
    }

    for (i, b) in tail.iter().enumerate() {
        match *b {
            b' ' | b'\t' => continue,
            b'\n' => return Suffix::Line(i + 1),
            b'\r' => {
                return match tail.get(i + 1) {
                    Some(b'\n') => Suffix::Line(i + 2),
                    Some(_) => Suffix::Invalid,
                    None => Suffix::NeedMore,
                }
            }
            _ => return Suffix::Invalid,
        }
    }

    Suffix::NeedMore
}

/// Incremental boundary splitter. Bytes go in through [`extend`](Self::extend),
/// raw parts come out of [`poll`](Self::poll).
///
/// The buffer always starts at the first byte not handed out yet: the
/// preamble while looking for the first boundary, afterwards the start of the
/// part being assembled.
#[derive(Debug)]
pub(crate) struct BoundaryParser {
    /// `--boundary`
    marker: Vec<u8>,
    /// `\n--boundary`, every boundary after the first one.
    delimiter: Vec<u8>,
    buffer: BytesMut,
    stage: Stage,
    searched_to: usize,
    headers_seen: bool,
    max_part_size: usize,
    max_header_size: usize,
}

impl BoundaryParser {
    pub fn new(boundary: &[u8], config: &ReaderConfig) -> Self {
        let mut marker = Vec::with_capacity(boundary.len() + 2);
        marker.extend_from_slice(b"--");
        marker.extend_from_slice(boundary);

        let mut delimiter = Vec::with_capacity(marker.len() + 1);
        delimiter.push(b'\n');
        delimiter.extend_from_slice(&marker);

        log::debug!(
            "Creating with boundary: {:?}",
            String::from_utf8_lossy(&marker)
        );

        Self {
            marker,
            delimiter,
            buffer: BytesMut::with_capacity(config.buffer_capacity),
            stage: Stage::Preamble,
            searched_to: 0,
            headers_seen: false,
            max_part_size: config.max_part_size,
            max_header_size: config.max_header_size,
        }
    }

    /// The boundary without the leading dashes.
    pub fn boundary(&self) -> &[u8] {
        &self.marker[2..]
    }

    pub fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }

    pub fn extend(&mut self, chunk: &[u8]) {
        if self.stage != Stage::Done {
            self.buffer.extend_from_slice(chunk);
        }
    }

    #[cfg(test)]
    pub fn parse<T: AsRef<[u8]>>(&mut self, chunk: T) -> ParseResult {
        self.extend(chunk.as_ref());
        self.poll()
    }

    /// Tries to cut the next part out of what has been buffered so far.
    pub fn poll(&mut self) -> ParseResult {
        if self.stage == Stage::Preamble {
            if let Some(res) = self.skip_preamble() {
                return res;
            }
        }

        match self.stage {
            Stage::Part => self.read_part(),
            _ => ParseResult::Done,
        }
    }

    /// Called once the source is exhausted.
    pub fn finish(&self) -> Result<(), Error> {
        match self.stage {
            Stage::Done => Ok(()),
            Stage::Preamble => Err(Error::malformed(
                "end of stream reached without finding a boundary",
            )),
            Stage::Part => Err(Error::malformed(
                "end of stream reached before the terminating boundary",
            )),
        }
    }

    /// Returns `None` once the opening boundary line has been consumed.
    fn skip_preamble(&mut self) -> Option<ParseResult> {
        let marker_len = self.marker.len();

        loop {
            // No line break is required in front of the first boundary.
            let start = match twoway::find_bytes(&self.buffer[self.searched_to..], &self.marker) {
                Some(i) => self.searched_to + i,
                None => {
                    // The preamble is discarded, keep only a possibly split marker.
                    let keep = marker_len - 1;
                    if self.buffer.len() > keep {
                        let discard = self.buffer.len() - keep;
                        self.buffer.advance(discard);
                    }
                    self.searched_to = 0;
                    return Some(ParseResult::NotReady);
                }
            };

            match delimiter_suffix(&self.buffer[start + marker_len..]) {
                Suffix::NeedMore => {
                    self.buffer.advance(start);
                    self.searched_to = 0;
                    return Some(self.check_pending());
                }

                Suffix::Final => {
                    log::debug!("Found stop sentinel at index: {}", start);
                    self.stage = Stage::Done;
                    self.buffer.clear();
                    return Some(ParseResult::Done);
                }

                Suffix::Line(n) => {
                    if start > 0 {
                        log::trace!("Skipping preamble of {} bytes", start);
                    }
                    self.buffer.advance(start + marker_len + n);
                    self.stage = Stage::Part;
                    self.searched_to = 0;
                    self.headers_seen = false;
                    return None;
                }

                // Only a prefix of the boundary, still preamble.
                Suffix::Invalid => self.searched_to = start + 1,
            }
        }
    }

    fn read_part(&mut self) -> ParseResult {
        let marker_len = self.marker.len();

        loop {
            // A boundary right at the start shares its line break with the
            // previous boundary line, leaving an empty part.
            let found = if self.searched_to == 0 && self.buffer.starts_with(&self.marker) {
                Some((0, 0))
            } else {
                twoway::find_bytes(&self.buffer[self.searched_to..], &self.delimiter).map(|i| {
                    let nl = self.searched_to + i;
                    let content_end = if nl > 0 && self.buffer[nl - 1] == b'\r' {
                        nl - 1
                    } else {
                        nl
                    };
                    (content_end, nl + 1)
                })
            };

            let (content_end, marker_start) = match found {
                Some(pos) => pos,
                None => {
                    self.searched_to = self
                        .buffer
                        .len()
                        .saturating_sub(self.delimiter.len() - 1);
                    return self.check_pending();
                }
            };

            let after = marker_start + marker_len;
            let suffix = delimiter_suffix(&self.buffer[after..]);

            if content_end > self.max_part_size && suffix != Suffix::NeedMore {
                return self.fail(Error::PartTooLarge {
                    limit: self.max_part_size,
                });
            }

            match suffix {
                Suffix::NeedMore => {
                    self.searched_to = content_end;
                    return self.check_pending();
                }

                Suffix::Final => {
                    let part = self.buffer.split_to(content_end).freeze();
                    self.buffer.clear();
                    self.stage = Stage::Done;
                    log::debug!("Found stop sentinel after part of {} bytes", part.len());
                    return ParseResult::Ready(RawPart {
                        bytes: part,
                        is_last: true,
                    });
                }

                Suffix::Line(n) => {
                    // We've found an entire part, snap it of and return it.
                    let part = self.buffer.split_to(content_end).freeze();
                    self.buffer.advance(after - content_end + n);
                    self.searched_to = 0;
                    self.headers_seen = false;
                    return ParseResult::Ready(RawPart {
                        bytes: part,
                        is_last: false,
                    });
                }

                // Boundary text inside the body, e.g. a longer nested boundary.
                Suffix::Invalid => self.searched_to = marker_start.max(1),
            }
        }
    }

    /// Enforces the size limits on bytes that are still waiting for a boundary.
    fn check_pending(&mut self) -> ParseResult {
        if self.buffer.len() > self.max_part_size {
            return self.fail(Error::PartTooLarge {
                limit: self.max_part_size,
            });
        }

        if self.stage == Stage::Part && !self.headers_seen {
            let window = self.buffer.len().min(self.max_header_size);
            if find_header_end(&self.buffer[..window]).is_some() {
                self.headers_seen = true;
            } else if self.buffer.len() >= self.max_header_size {
                return self.fail(Error::malformed(format!(
                    "no blank line ending the part headers within {} bytes",
                    self.max_header_size
                )));
            }
        }

        ParseResult::NotReady
    }

    fn fail(&mut self, e: Error) -> ParseResult {
        self.stage = Stage::Done;
        self.buffer.clear();
        log::debug!("Parser failed: {}", e);
        ParseResult::Err(e)
    }
}
