//! Blocking reader for multipart streams.
//!
//! Feeds a [`std::io::Read`] source through a boundary splitter and hands out
//! each part's headers and body. Unlike a strict multipart reader, the first
//! boundary does not have to be preceded by a line break.

mod error;
pub use error::Error;

mod config;
pub use config::{
    ReaderConfig, DEFAULT_BUFFER_CAP, DEFAULT_MAX_HEADER_SIZE, DEFAULT_MAX_PART_SIZE,
    DEFAULT_READ_CHUNK,
};

mod headers;
pub use headers::PartHeaders;

mod multipart;
pub use multipart::{MultipartStreamReader, ReadOutcome};

mod part;
pub use part::Part;

mod parser;

mod source;
pub use source::ChunkSource;

mod header_map;
pub use header_map::HeaderMap;

use std::io::Read;

/// Builds a reader from the `Content-Type` found in `headers`.
pub fn from_headers<R: Read>(
    headers: impl HeaderMap,
    source: R,
) -> Result<MultipartStreamReader<R>, Error> {
    from_headers_with_config(headers, source, ReaderConfig::default())
}

pub fn from_headers_with_config<R: Read>(
    headers: impl HeaderMap,
    source: R,
    config: ReaderConfig,
) -> Result<MultipartStreamReader<R>, Error> {
    let content_type = headers
        .get_value("content-type")
        .ok_or(Error::ContentTypeMissing)?;

    MultipartStreamReader::from_content_type_with_config(source, content_type, config)
}
