//! Error types for specification parsing.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse outcome classification, mirroring the historical status codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Success,
    BadArg,
    Syntax,
    Unknown,
    Os,
}

#[derive(Debug, Error)]
pub enum Error {
    /// A lexical or grammatical failure. The message is user-facing.
    #[error("{0}")]
    Syntax(String),

    /// An identifier that no amount of prefix peeling could resolve.
    #[error("Don't recognize \"{0}\"")]
    Unknown(String),

    #[error("input is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

impl Error {
    pub fn status(&self) -> Status {
        match self {
            Error::Syntax(_) => Status::Syntax,
            Error::Unknown(_) => Status::Unknown,
            Error::InvalidUtf8(_) => Status::BadArg,
        }
    }
}

impl From<mensura_core::Error> for Error {
    fn from(err: mensura_core::Error) -> Error {
        Error::Syntax(err.to_string())
    }
}
