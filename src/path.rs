use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("path is empty")]
    Empty,
    #[error("path '{input}' must start with '/'")]
    MissingLeadingSlash { input: String },
    #[error("path '{input}' contains control or whitespace byte {byte:#04x}")]
    ControlOrWhitespace { input: String, byte: u8 },
    #[error("path '{input}' is not valid UTF-8 after normalization")]
    InvalidUtf8 { input: String },
}

pub type PathResult<T> = Result<T, PathError>;

/// Normalizes a request path: requires the leading slash, collapses
/// duplicate slashes, trims the trailing slash, and rejects control bytes.
/// Route templates are not passed through here; their brace expressions may
/// legitimately contain spaces.
#[tracing::instrument(level = "trace", fields(path_len = path.len() as u64))]
pub fn normalize_path(path: &str) -> PathResult<String> {
    if path.is_empty() {
        return Err(PathError::Empty);
    }
    if !path.starts_with('/') {
        return Err(PathError::MissingLeadingSlash {
            input: path.to_string(),
        });
    }

    let mut output = Vec::with_capacity(path.len());
    let mut prev_was_slash = false;

    for &byte in path.as_bytes() {
        if byte == b'/' {
            if prev_was_slash {
                continue;
            }
            output.push(byte);
            prev_was_slash = true;
            continue;
        }
        if byte <= 0x20 || byte == 0x7f {
            return Err(PathError::ControlOrWhitespace {
                input: path.to_string(),
                byte,
            });
        }
        output.push(byte);
        prev_was_slash = false;
    }

    while output.len() > 1 && output.last() == Some(&b'/') {
        output.pop();
    }

    String::from_utf8(output).map_err(|_| PathError::InvalidUtf8 {
        input: path.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_duplicates_and_trims_trailing_slashes() {
        let normalized = normalize_path("//foo//bar///").expect("normalize");
        assert_eq!(normalized, "/foo/bar");
    }

    #[test]
    fn keeps_the_root_path() {
        assert_eq!(normalize_path("/").expect("normalize"), "/");
    }

    #[test]
    fn rejects_missing_leading_slash() {
        let err = normalize_path("foo/bar").expect_err("leading slash required");
        match err {
            PathError::MissingLeadingSlash { .. } => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_control_bytes() {
        let err = normalize_path("/foo\tbar").expect_err("control byte rejected");
        match err {
            PathError::ControlOrWhitespace { byte, .. } => assert_eq!(byte, b'\t'),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn accepts_unicode_segments() {
        assert_eq!(normalize_path("/caf\u{e9}").expect("normalize"), "/caf\u{e9}");
    }
}
