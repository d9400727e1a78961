use std::{error::Error as StdError, fmt, io};

#[derive(Debug)]
pub enum Error {
    /// The reader cannot be constructed from the given arguments,
    /// e.g. an empty boundary.
    InvalidArgument(String),
    /// The byte source failed. Passed through untouched.
    Io(io::Error),
    MalformedStream(String),
    /// A part grew past [`ReaderConfig::max_part_size`](crate::ReaderConfig) bytes.
    PartTooLarge { limit: usize },
    ContentTypeMissing,
    NotMultipart,
    InvalidMimeType(mime::FromStrError),
}

impl Error {
    pub(crate) fn malformed<S: Into<String>>(msg: S) -> Self {
        Error::MalformedStream(msg.into())
    }

    pub(crate) fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Error::InvalidArgument(msg.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::InvalidArgument(ref msg) => write!(f, "Invalid argument: {}", msg),
            Error::Io(ref e) => write!(f, "Byte source: {}", e),
            Error::MalformedStream(ref msg) => write!(f, "Malformed multipart stream: {}", msg),
            Error::PartTooLarge { limit } => {
                write!(f, "Multipart part exceeds the limit of {} bytes", limit)
            }
            Error::ContentTypeMissing => write!(f, "Content Type header missing"),
            Error::NotMultipart => write!(f, "Cannot handle a non multipart body as multipart."),
            Error::InvalidMimeType(ref e) => write!(f, "Content-Type value invalid: {}", e),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::Io(ref e) => Some(e),
            Error::InvalidMimeType(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(inner: io::Error) -> Self {
        Error::Io(inner)
    }
}

impl From<mime::FromStrError> for Error {
    fn from(inner: mime::FromStrError) -> Self {
        Error::InvalidMimeType(inner)
    }
}
