use percent_encoding::percent_decode_str;
use std::borrow::Cow;

// Splits a route pattern or request path into its non-empty segments.
//
// Empty segments are dropped, so leading, trailing and doubled slashes are
// normalized away. Splitting stops right after the first segment that starts
// with the wildcard marker: everything past it belongs to the catch-all and is
// recovered from the request path at match time.
pub(crate) fn segments(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();

    for segment in path.split('/').filter(|s| !s.is_empty()) {
        segments.push(segment);

        if segment.starts_with(WILDCARD) {
            break;
        }
    }

    segments
}

// Splits a request path like `segments`, then percent-decodes every segment.
//
// Decoding happens after splitting, so an encoded `%2F` stays inside its
// segment. Invalid UTF-8 is replaced rather than rejected.
pub(crate) fn decoded_segments(path: &str) -> Vec<Cow<'_, str>> {
    segments(path)
        .into_iter()
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy())
        .collect()
}

// Returns `true` if a wildcard segment is followed by any other segment.
pub(crate) fn has_trailing_segments(pattern: &str) -> bool {
    let mut wildcard = false;

    for segment in pattern.split('/').filter(|s| !s.is_empty()) {
        if wildcard {
            return true;
        }

        wildcard = segment.starts_with(WILDCARD);
    }

    false
}

pub(crate) const PARAM: char = ':';
pub(crate) const WILDCARD: char = '*';

#[cfg(test)]
mod tests {
    use super::*;

    // path, segments
    fn segment_tests() -> Vec<(&'static str, Vec<&'static str>)> {
        vec![
            ("", vec![]),
            ("/", vec![]),
            ("//", vec![]),
            ("/abc", vec!["abc"]),
            ("abc", vec!["abc"]),
            ("/abc/", vec!["abc"]),
            ("/a/b/c", vec!["a", "b", "c"]),
            ("//a///b//", vec!["a", "b"]),
            ("/user/:id", vec!["user", ":id"]),
            ("/files/*rest", vec!["files", "*rest"]),
            ("/files/*rest/more/stuff", vec!["files", "*rest"]),
            ("/files/*", vec!["files", "*"]),
            ("/*/x", vec!["*"]),
            ("/ʯ/β", vec!["ʯ", "β"]),
        ]
    }

    #[test]
    fn test_segments() {
        for (path, expected) in segment_tests() {
            assert_eq!(segments(path), expected, "{path}");
        }
    }

    #[test]
    fn test_trailing_segments() {
        assert!(!has_trailing_segments("/files/*rest"));
        assert!(!has_trailing_segments("/files/*rest/"));
        assert!(!has_trailing_segments("/a/:b/c"));
        assert!(has_trailing_segments("/files/*rest/x"));
        assert!(has_trailing_segments("/*/x"));
    }

    #[test]
    fn test_decoded_segments() {
        let tests = [
            ("/user/hello%20world", vec!["user", "hello world"]),
            ("/user/a%2Fb", vec!["user", "a/b"]),
            ("/caf%C3%A9/%3Aid", vec!["café", ":id"]),
            ("/plain/path", vec!["plain", "path"]),
            ("/bad/%FF", vec!["bad", "\u{FFFD}"]),
            ("/trailing%", vec!["trailing%"]),
        ];

        for (path, expected) in tests {
            assert_eq!(decoded_segments(path), expected, "{path}");
        }
    }
}
