// Error types shared by the API client, the cloud/store wrappers and the
// upload orchestrator. The binary wraps these in `anyhow` at the edge.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why the remote API refused a response. The service reports failure in
/// two places: the HTTP status line and a numeric code in the body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// HTTP status other than 200.
    Http(u16),
    /// HTTP 200 but the body parsed as an integer other than 200.
    Body(i64),
}

impl Rejection {
    /// The offending code, whichever channel it came from.
    pub fn code(&self) -> i64 {
        match self {
            Rejection::Http(status) => i64::from(*status),
            Rejection::Body(code) => *code,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Http(status) => write!(f, "HTTP status {}", status),
            Rejection::Body(code) => write!(f, "response code {}", code),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Authentication failed: {0}")]
    Authentication(Rejection),

    #[error("Authentication response carried no session cookie")]
    MissingSessionCookie,

    #[error("Wrong status code: {0}")]
    UnexpectedStatus(Rejection),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Filesystem error at {path:?}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Path is not valid UTF-8: {0:?}")]
    NonUtf8Path(PathBuf),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// The rejected status, for either the login or a regular call.
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Error::Authentication(r) | Error::UnexpectedStatus(r) => Some(*r),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
