use std::{
    io::{self, Read},
    iter::FusedIterator,
    ops::ControlFlow,
};

use crate::{
    parser::{BoundaryParser, ParseResult},
    Error, Part, PartHeaders, ReaderConfig,
};

/// How a successful [`MultipartStreamReader::read_all_parts`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The terminating boundary was reached.
    Completed,
    /// The callback asked to stop before the end of the stream.
    StoppedEarly,
}

/// Blocking multipart reader over any [`Read`] source.
///
/// The following rules apply:
/// The first boundary may appear anywhere, it does not have to be preceded by
/// a line break and whatever comes before it is discarded. Every following
/// boundary MUST be preceded by CRLF or LF, which is considered part of that
/// boundary; e.g. given the boundary "blockmehere" the byte sequence cutting
/// a part off is "\r\n--blockmehere".
///
/// After a boundary comes either `--`, ending the stream, or a line break.
/// Then the headers of the part follow, ended by an empty line, then the body.
///
/// Examples:
///  --simple boundary
///  Content-type: text/plain; charset=us-ascii
///
///  This is explicitly typed plain ASCII text.
///  It DOES end with a linebreak.
///
///  --simple boundary
///
///  This part has no headers.
///  --simple boundary--
pub struct MultipartStreamReader<R> {
    inner: R,
    parser: BoundaryParser,
    chunk: Vec<u8>,
    max_header_size: usize,
    parts_read: usize,
    session: Session,
}

/// Where the read session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Session {
    Active,
    /// The terminating boundary was seen.
    Completed,
    Stopped,
    Failed,
}

impl<R: Read> MultipartStreamReader<R> {
    pub fn new<B: AsRef<[u8]>>(inner: R, boundary: B) -> Result<Self, Error> {
        Self::with_config(inner, boundary, ReaderConfig::default())
    }

    pub fn with_config<B: AsRef<[u8]>>(
        inner: R,
        boundary: B,
        config: ReaderConfig,
    ) -> Result<Self, Error> {
        let boundary = boundary.as_ref();
        if boundary.is_empty() {
            return Err(Error::invalid_argument("boundary must not be empty"));
        }

        Ok(Self {
            inner,
            parser: BoundaryParser::new(boundary, &config),
            chunk: vec![0; config.read_chunk_size.max(1)],
            max_header_size: config.max_header_size,
            parts_read: 0,
            session: Session::Active,
        })
    }

    /// Takes the boundary from a `Content-Type` value such as
    /// `multipart/mixed; boundary=XYZ`.
    pub fn from_content_type(inner: R, content_type: &str) -> Result<Self, Error> {
        Self::from_content_type_with_config(inner, content_type, ReaderConfig::default())
    }

    pub fn from_content_type_with_config(
        inner: R,
        content_type: &str,
        config: ReaderConfig,
    ) -> Result<Self, Error> {
        let mime_type = content_type.parse::<mime::Mime>()?;

        if mime_type.type_() != mime::MULTIPART {
            return Err(Error::NotMultipart);
        }

        match mime_type.get_param("boundary") {
            Some(boundary) => {
                log::debug!("Creating reader for {}", mime_type);
                Self::with_config(inner, boundary.as_str(), config)
            }

            None => Err(Error::invalid_argument("mime param boundary missing")),
        }
    }

    /// Reads every part, handing each one to `callback` together with a flag
    /// telling whether it is the last one.
    ///
    /// The header and body references are only valid during the call.
    /// Returning `ControlFlow::Break(())` stops reading and yields
    /// [`ReadOutcome::StoppedEarly`].
    ///
    /// Once the terminator was seen, calling this again reports `Completed`
    /// without invoking `callback`. After a failure or an early stop it fails
    /// with `Error::InvalidArgument`.
    pub fn read_all_parts<F>(&mut self, mut callback: F) -> Result<ReadOutcome, Error>
    where
        F: FnMut(&PartHeaders, &[u8], bool) -> ControlFlow<()>,
    {
        match self.session {
            Session::Active | Session::Completed => {}
            Session::Stopped => {
                return Err(Error::invalid_argument("read session was stopped early"))
            }
            Session::Failed => {
                return Err(Error::invalid_argument("read session already failed"))
            }
        }

        while let Some(part) = self.next_part()? {
            if callback(part.headers(), part.body(), part.is_last()).is_break() {
                log::debug!("Callback stopped reading after {} parts", self.parts_read);
                self.session = Session::Stopped;
                return Ok(ReadOutcome::StoppedEarly);
            }
        }

        Ok(ReadOutcome::Completed)
    }

    /// Returns the next part, or `None` once the terminating boundary was seen.
    ///
    /// Any error ends the session, later calls return `Ok(None)`.
    pub fn next_part(&mut self) -> Result<Option<Part>, Error> {
        if self.session != Session::Active {
            return Ok(None);
        }

        let res = self.read_part();
        match res {
            Ok(Some(ref part)) if !part.is_last() => {}
            Ok(_) => self.session = Session::Completed,
            Err(_) => self.session = Session::Failed,
        }
        res
    }

    fn read_part(&mut self) -> Result<Option<Part>, Error> {
        loop {
            match self.parser.poll() {
                ParseResult::Ready(raw) => {
                    let part = Part::parse(raw.bytes, raw.is_last, self.max_header_size)?;
                    self.parts_read += 1;
                    log::debug!(
                        "Part {} ready (body size: {}, last: {})",
                        self.parts_read,
                        part.body_len(),
                        part.is_last()
                    );
                    return Ok(Some(part));
                }

                ParseResult::Done => return Ok(None),

                ParseResult::Err(e) => return Err(e),

                ParseResult::NotReady => {}
            }

            if self.fill()? == 0 {
                self.parser.finish()?;
                return Ok(None);
            }
        }
    }

    /// Pulls one chunk from the source into the parser. Zero means end of stream.
    fn fill(&mut self) -> Result<usize, Error> {
        loop {
            match self.inner.read(&mut self.chunk) {
                Ok(n) => {
                    log::trace!("Read {} bytes", n);
                    self.parser.extend(&self.chunk[..n]);
                    return Ok(n);
                }

                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,

                Err(e) => {
                    log::warn!("Reading multipart source failed: {}", e);
                    return Err(Error::Io(e));
                }
            }
        }
    }
}

impl<R> MultipartStreamReader<R> {
    /// The boundary as given, without the leading dashes.
    pub fn boundary(&self) -> &[u8] {
        self.parser.boundary()
    }

    /// Number of parts handed out so far.
    pub fn parts_read(&self) -> usize {
        self.parts_read
    }

    /// True once the session ended, by terminator, error or early stop.
    pub fn is_finished(&self) -> bool {
        self.session != Session::Active || self.parser.is_done()
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Iterator for MultipartStreamReader<R> {
    type Item = Result<Part, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_part().transpose()
    }
}

impl<R: Read> FusedIterator for MultipartStreamReader<R> {}
