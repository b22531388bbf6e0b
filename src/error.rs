//! Error handling for the crate.
//!
//! Internally everything is an `anyhow::Error`. When an error leaves a command it is tagged with
//! an `ErrorType` so that callers (and tests) can tell which stage of the import failed without
//! parsing messages.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The broad category of a failure that is surfaced to the user.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The tally home directory or `config.json` is missing or invalid.
    Config,
    /// The uploaded file could not be decoded as a spreadsheet.
    Spreadsheet,
    /// The request never produced a usable response (connection refused, timeout, etc.).
    Request,
    /// The server answered, but rejected the request or returned something we do not understand.
    Server,
    /// A local file operation failed.
    Io,
    /// An upload did not go through: invalid rows, an empty file or a refusal by the server.
    Upload,
}

impl Display for ErrorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = serde_plain::to_string(self).map_err(|_| std::fmt::Error)?;
        write!(f, "{name} error")
    }
}

/// Tags a result's error with an `ErrorType`.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| e.into().context(error_type))
    }
}

/// Returns the `ErrorType` that an error was tagged with, if any.
pub fn error_type(e: &Error) -> Option<ErrorType> {
    e.downcast_ref::<ErrorType>().copied()
}
