use thiserror::Error;

/// Everything that can go wrong during a single login attempt. All of these
/// make the attempt inconclusive, none of them is fatal to the session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum Error {
    #[error("failed to connect to {address}: {reason}")]
    ConnectionFailed { address: String, reason: String },
    #[error("failed sending authentication data: {0}")]
    SendFailed(String),
    #[error("no data received")]
    NoData,
    #[error("failed receiving server response: {0}")]
    ReceiveFailed(String),
    #[error("error while parsing http status code from {0:?}")]
    StatusParse(String),
    #[error("redirect could not be followed because the location header could not be found")]
    MissingLocationHeader,
    #[error("path type of {0:?} is unknown")]
    UnresolvableRedirect(String),
    #[error("received http status code {0}, cannot proceed")]
    UnsupportedStatus(i64),
    #[error("more than {0} redirects followed")]
    TooManyRedirects(usize),
    #[error("unexpected event {event} while in state {state}")]
    UnexpectedState { state: String, event: String },
    #[error("invalid FORM-DATA format {0:?}")]
    InvalidFormConfiguration(String),
}
