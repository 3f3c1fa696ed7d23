use std::fmt;

/// Outcome of a single credential attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Verdict {
    Success,
    /// The deny signal was found.
    Fail,
    /// Protocol, transport or format error.
    Unknown,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Verdict::Success => "success",
                Verdict::Fail => "fail",
                Verdict::Unknown => "unknown",
            }
        )
    }
}

impl<E> From<&Result<Verdict, E>> for Verdict {
    fn from(result: &Result<Verdict, E>) -> Self {
        match result {
            Ok(verdict) => *verdict,
            Err(_) => Verdict::Unknown,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum State {
    Initialize,
    New,
    Running,
    Exiting,
    Complete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Event {
    /// Configuration resolved against its defaults.
    Configured,
    Connected,
    /// A redirect was followed, the same credentials must be replayed.
    Redirected,
    /// A verdict has been reached for the current credentials.
    Judged,
    /// Any error, the attempt is inconclusive.
    Failed,
    Closed,
}

pub(crate) fn transition(state: State, event: Event) -> State {
    match (state, event) {
        (State::Initialize, Event::Configured) => State::New,
        (State::New, Event::Connected) => State::Running,
        (State::Running, Event::Redirected) => State::New,
        (State::Running, Event::Judged) => State::Exiting,
        (State::Initialize | State::New | State::Running, Event::Failed) => State::Exiting,
        (State::Exiting, Event::Closed) => State::Complete,
        (State::Complete, _) => State::Complete,
        (state, event) => {
            log::error!("unexpected event {:?} in state {:?}, exiting", event, state);
            State::Exiting
        }
    }
}
