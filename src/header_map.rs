/// A header source, implemented for http::HeaderMap.
/// The outer response is parsed elsewhere, the reader only needs to look up
/// its `Content-Type` value.
pub trait HeaderMap {
    fn get_value<K>(&self, header_key: K) -> Option<&str>
    where
        K: AsRef<str>;
}

impl HeaderMap for http::header::HeaderMap {
    fn get_value<K>(&self, header_key: K) -> Option<&str>
    where
        K: AsRef<str>,
    {
        self.get(header_key.as_ref())
            .and_then(|hv| hv.to_str().ok())
    }
}

impl<T: HeaderMap> HeaderMap for &T {
    fn get_value<K>(&self, header_key: K) -> Option<&str>
    where
        K: AsRef<str>,
    {
        (**self).get_value(header_key)
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use http::header::{HeaderValue, CONTENT_TYPE};

    #[test]
    fn lookup_in_http_header_map() {
        let mut headers = http::header::HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("multipart/mixed; boundary=XYZ"),
        );

        assert_eq!(
            Some("multipart/mixed; boundary=XYZ"),
            headers.get_value("Content-Type")
        );
        assert_eq!(None, (&headers).get_value("content-length"));
    }
}
