const CRLF: &str = "\r\n";

/// Case insensitive substring search, returns the byte offset of the first match.
pub(crate) fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }

    let haystack = haystack.as_bytes();
    let needle = needle.as_bytes();

    haystack
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

/// Look for `name` (colon included) at the start of a line of `src`, starting
/// at byte offset `from`. On success returns the header value and the offset
/// right after it, so that the scan can be resumed for repeated headers.
pub(crate) fn find_header_value<'a>(
    name: &str,
    src: &'a str,
    from: usize,
) -> Option<(&'a str, usize)> {
    let tail = src.get(from..)?;
    let pattern = format!("{}{}", CRLF, name);
    let found = find_ignore_case(tail, &pattern)?;

    let start = from + found + pattern.len();
    let start = start
        + src[start..]
            .bytes()
            .take_while(|b| *b == b' ' || *b == b'\t')
            .count();

    let end = start
        + src[start..]
            .bytes()
            .position(|b| b == b'\r' || b == b'\n')
            .unwrap_or(src.len() - start);

    Some((&src[start..end], end))
}

/// Iterates over every value of a repeated header.
pub(crate) struct HeaderValues<'a> {
    name: &'a str,
    src: &'a str,
    position: usize,
}

impl<'a> HeaderValues<'a> {
    pub fn new(name: &'a str, src: &'a str) -> Self {
        Self {
            name,
            src,
            position: 0,
        }
    }
}

impl<'a> Iterator for HeaderValues<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let (value, next) = find_header_value(self.name, self.src, self.position)?;
        self.position = next;
        Some(value)
    }
}
