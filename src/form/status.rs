use std::fmt;

/// Classification of an HTTP status line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Status {
    Ok,
    MovedPermanently,
    Found,
    TemporaryRedirect,
    PermanentRedirect,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    /// Well formed status line with a code we don't act on.
    NotImplemented(i64),
}

impl Status {
    pub fn code(&self) -> i64 {
        match self {
            Status::Ok => 200,
            Status::MovedPermanently => 301,
            Status::Found => 302,
            Status::TemporaryRedirect => 307,
            Status::PermanentRedirect => 308,
            Status::BadRequest => 400,
            Status::Unauthorized => 401,
            Status::Forbidden => 403,
            Status::NotFound => 404,
            Status::NotImplemented(code) => *code,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(
            self,
            Status::MovedPermanently
                | Status::Found
                | Status::TemporaryRedirect
                | Status::PermanentRedirect
        )
    }

    /// 301 and 302 allow a POST to be replayed as GET.
    pub fn allows_method_change(&self) -> bool {
        matches!(self, Status::MovedPermanently | Status::Found)
    }

    fn from_code(code: i64) -> Self {
        match code {
            200 => Status::Ok,
            301 => Status::MovedPermanently,
            302 => Status::Found,
            307 => Status::TemporaryRedirect,
            308 => Status::PermanentRedirect,
            400 => Status::BadRequest,
            401 => Status::Unauthorized,
            403 => Status::Forbidden,
            404 => Status::NotFound,
            other => Status::NotImplemented(other),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:3}", self.code())
    }
}

/// Parse the status code out of a line like `HTTP/1.1 200 OK`.
///
/// Returns `None` when the line has no space at all. The code itself is read
/// the way `strtol` would: leading whitespace and an optional sign, then as
/// many digits as are present. A line with no digits there parses as code 0,
/// which is reported as `NotImplemented`.
pub(crate) fn parse_status(line: &str) -> Option<Status> {
    let (_, rest) = line.split_once(' ')?;
    let rest = rest.trim_start();

    let (negative, digits) = match rest.as_bytes().first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());

    let code = digits[..end].parse::<i64>().unwrap_or(0);

    Some(Status::from_code(if negative { -code } else { code }))
}
