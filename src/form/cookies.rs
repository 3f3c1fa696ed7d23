use super::header::HeaderValues;

const SET_COOKIE: &str = "Set-Cookie:";
const COOKIE_HEADER: &str = "Cookie: ";
const CRLF: &str = "\r\n";

/// Replay-ready `Cookie:` header block built from every `Set-Cookie` seen.
/// Values are kept verbatim, attributes included, and never deduplicated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct CookieJar {
    block: String,
}

impl CookieJar {
    /// Append every `Set-Cookie` value found in `response`. Returns how many
    /// were added.
    pub fn ingest(&mut self, response: &str) -> usize {
        let mut added = 0;
        for value in HeaderValues::new(SET_COOKIE, response) {
            log::debug!("storing cookie {:?}", value);

            self.block.push_str(COOKIE_HEADER);
            self.block.push_str(value);
            self.block.push_str(CRLF);
            added += 1;
        }
        added
    }

    pub fn clear(&mut self) {
        self.block.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.block.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.block
    }
}
