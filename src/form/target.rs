use std::fmt;

use url::Url;

use crate::session::Error;
use crate::utils;

const HTTP_PORT: u16 = 80;
const HTTPS_PORT: u16 = 443;

/// Host to test, as given on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Target {
    pub host: String,
    pub port: u16,
    pub ssl: bool,
    /// Resource path when the target was given as a full url.
    pub path: Option<String>,
}

impl Target {
    /// Parse `host`, `host:port`, `[ipv6]:port` or `http(s)://host[:port]/path`.
    pub fn parse(raw: &str, ssl: bool, port: Option<u16>) -> Result<Self, Error> {
        if raw.contains("://") {
            let url = Url::parse(raw).map_err(|e| format!("invalid target {}: {}", raw, e))?;
            let ssl = ssl || url.scheme().eq_ignore_ascii_case("https");
            let host = url
                .host_str()
                .ok_or_else(|| format!("no host in target {}", raw))?
                .trim_start_matches('[')
                .trim_end_matches(']')
                .to_owned();
            let port = port
                .or(url.port())
                .unwrap_or(if ssl { HTTPS_PORT } else { HTTP_PORT });
            let path = match url.path() {
                "" | "/" => None,
                path => Some(path.to_owned()),
            };

            Ok(Self {
                host,
                port,
                ssl,
                path,
            })
        } else {
            let (host, parsed_port) =
                utils::parse_target(raw, if ssl { HTTPS_PORT } else { HTTP_PORT })?;

            Ok(Self {
                host,
                port: port.unwrap_or(parsed_port),
                ssl,
                path: None,
            })
        }
    }

    /// `host:port`, with ipv6 addresses in brackets.
    pub fn authority(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.authority())
    }
}
