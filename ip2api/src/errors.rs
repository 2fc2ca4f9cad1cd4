//! Errors for this crate.

use crate::types::Username;
use reqwest::StatusCode;

#[derive(thiserror::Error, Debug)]
pub enum InvalidIp2Url {
    #[error("Given URL does not start with \"http://\" or \"https://\": {0}")]
    Protocol(String),

    #[error("Given URL is not valid: {0} ({1})")]
    Parse(String, url::ParseError),
}

aliri_braid::from_infallible!(InvalidIp2Url);

/// Errors representing failed interactions with IP2.
#[derive(thiserror::Error, Debug)]
pub enum Ip2Error {
    /// IP2 did not accept the given credentials or session cookie.
    #[error("IP2 rejected the credentials of user \"{0}\"")]
    Authentication(Username),

    /// Error when trying to get an object but it is not found.
    #[error("{kind} \"{name}\" not found")]
    NotFound { kind: &'static str, name: String },

    /// Refusal to create an object with a name which is already taken.
    #[error("{kind} \"{name}\" already exists in {parent}")]
    AlreadyExists {
        kind: &'static str,
        name: String,
        parent: String,
    },

    /// The experiment has no search to refer to.
    #[error("No search was run for experiment \"{0}\"")]
    SearchNotRun(String),

    /// Error response from IP2.
    #[error("({status:?} {reason:?}): {text}")]
    Status {
        status: StatusCode,
        reason: &'static str,
        text: String,
        source: reqwest::Error,
    },

    /// The request did not complete (connection refused, timeout, ...).
    #[error(transparent)]
    Network(#[from] reqwest::Error),

    /// A page from IP2 did not contain what it should have.
    #[error("could not find {what} in response from {page}")]
    Malformed { what: &'static str, page: String },
}

impl Ip2Error {
    pub(crate) fn not_found(kind: &'static str, name: impl ToString) -> Self {
        Ip2Error::NotFound {
            kind,
            name: name.to_string(),
        }
    }

    pub(crate) fn malformed(what: &'static str, page: impl ToString) -> Self {
        Ip2Error::Malformed {
            what,
            page: page.to_string(),
        }
    }
}

pub(crate) fn check(
    res: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, Ip2Error> {
    match res.error_for_status_ref() {
        Ok(_) => Ok(res),
        Err(source) => {
            let status = res.status();
            let reason = status.canonical_reason().unwrap_or("unknown reason");
            let text = res.text().map_err(Ip2Error::Network)?;
            Err(Ip2Error::Status {
                status,
                reason,
                text,
                source,
            })
        }
    }
}

/// An error which might occur while uploading files.
#[derive(thiserror::Error, Debug)]
pub enum FileIOError {
    #[error("\"{0}\" is an invalid file path")]
    PathError(String),
    #[error(transparent)]
    Ip2(Ip2Error),
    #[error(transparent)]
    IO(std::io::Error),
}

impl From<reqwest::Error> for FileIOError {
    fn from(e: reqwest::Error) -> Self {
        FileIOError::Ip2(Ip2Error::Network(e))
    }
}

impl From<Ip2Error> for FileIOError {
    fn from(e: Ip2Error) -> Self {
        FileIOError::Ip2(e)
    }
}

impl From<std::io::Error> for FileIOError {
    fn from(e: std::io::Error) -> Self {
        FileIOError::IO(e)
    }
}
