use std::fmt;

/// A basic error type from this library.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Invalid configuration, e.g. an unsupported interface, a hostname
    /// over the interface limit, or a second server while one is active.
    Config(String),

    /// A bounded resource ran out: no free service slot, or no memory
    /// for even the first search result.
    Exhausted(String),

    /// The responder backend refused to start a search. Distinct from a
    /// search that runs but finds nothing, which is not an error.
    StartFailure(String),

    /// An operation was called on a deinited server.
    Logic(String),

    /// A generic error message.
    Msg(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(s) => write!(f, "invalid configuration: {}", s),
            Error::Exhausted(s) => write!(f, "resource exhausted: {}", s),
            Error::StartFailure(s) => write!(f, "{}", s),
            Error::Logic(s) => write!(f, "{}", s),
            Error::Msg(s) => write!(f, "{}", s),
        }
    }
}

impl std::error::Error for Error {}

/// One and only `Result` type from this library crate.
pub type Result<T> = core::result::Result<T, Error>;
