use std::{
    fmt,
    io::{self, Read},
};

/// Turns an iterator of byte chunks, the shape of a chunked response body,
/// into a [`Read`] source for [`MultipartStreamReader`](crate::MultipartStreamReader).
///
/// An `Err` chunk surfaces as an `io::Error` carrying its message.
pub struct ChunkSource<I, T> {
    inner: I,
    current: Option<T>,
    pos: usize,
}

impl<I, T, E> ChunkSource<I, T>
where
    I: Iterator<Item = Result<T, E>>,
{
    pub fn new<C>(chunks: C) -> Self
    where
        C: IntoIterator<IntoIter = I, Item = Result<T, E>>,
    {
        Self {
            inner: chunks.into_iter(),
            current: None,
            pos: 0,
        }
    }

    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I, T, E> Read for ChunkSource<I, T>
where
    I: Iterator<Item = Result<T, E>>,
    T: AsRef<[u8]>,
    E: fmt::Display,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            if let Some(ref chunk) = self.current {
                let bytes = &chunk.as_ref()[self.pos..];
                if !bytes.is_empty() {
                    let n = bytes.len().min(buf.len());
                    buf[..n].copy_from_slice(&bytes[..n]);
                    self.pos += n;
                    return Ok(n);
                }
            }

            match self.inner.next() {
                Some(Ok(chunk)) => {
                    self.current = Some(chunk);
                    self.pos = 0;
                }

                Some(Err(e)) => {
                    return Err(io::Error::new(
                        io::ErrorKind::Other,
                        format!("InnerStream: {}", e),
                    ))
                }

                None => {
                    self.current = None;
                    return Ok(0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn reads_across_chunks() {
        let chunks: Vec<Result<Vec<u8>, String>> =
            vec![Ok(b"abc".to_vec()), Ok(Vec::new()), Ok(b"defgh".to_vec())];
        let mut source = ChunkSource::new(chunks);

        let mut out = Vec::new();
        source.read_to_end(&mut out).expect("read chunks");
        assert_eq!(b"abcdefgh".to_vec(), out);
    }

    #[test]
    fn small_buffer_splits_a_chunk() {
        let chunks: Vec<Result<&str, String>> = vec![Ok("hello")];
        let mut source = ChunkSource::new(chunks);
        let mut buf = [0u8; 2];

        assert_eq!(2, source.read(&mut buf).expect("read"));
        assert_eq!(b"he", &buf);
        assert_eq!(2, source.read(&mut buf).expect("read"));
        assert_eq!(1, source.read(&mut buf).expect("read"));
        assert_eq!(b'o', buf[0]);
        assert_eq!(0, source.read(&mut buf).expect("eof"));
    }

    #[test]
    fn chunk_error_becomes_io_error() {
        let chunks: Vec<Result<&str, &str>> = vec![Ok("ab"), Err("connection dropped")];
        let mut source = ChunkSource::new(chunks);
        let mut buf = [0u8; 8];

        assert_eq!(2, source.read(&mut buf).expect("first chunk"));
        let err = source.read(&mut buf).expect_err("second chunk fails");
        assert_eq!(io::ErrorKind::Other, err.kind());
        assert!(err.to_string().contains("connection dropped"));
    }

    #[test]
    fn into_inner_returns_remaining_chunks() {
        let chunks: Vec<Result<&str, String>> = vec![Ok("ab"), Ok("cd"), Ok("ef")];
        let mut source = ChunkSource::new(chunks);
        let mut buf = [0u8; 2];
        assert_eq!(2, source.read(&mut buf).expect("first chunk"));

        let rest: Vec<&str> = source
            .into_inner()
            .map(|chunk| chunk.expect("ok chunk"))
            .collect();
        assert_eq!(vec!["cd", "ef"], rest);
    }
}
