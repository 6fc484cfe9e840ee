//! Types for working with errors produced by sqlx-h2.

use std::error::Error as StdError;
use std::io;
use std::result::Result as StdResult;

/// A specialized `Result` type for sqlx-h2.
pub type Result<T, E = Error> = StdResult<T, E>;

// Convenience type alias for usage within sqlx-h2.
pub type BoxDynError = Box<dyn StdError + 'static + Send + Sync>;

/// Represents all the ways a method can fail within sqlx-h2.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The connection string is not a well-formed URL.
    #[error("failed to parse connection url: {0}")]
    UrlSyntax(#[source] url::ParseError),

    /// The connection string carries a query parameter the driver does not understand.
    #[error("unknown H2 server connection parameter `{key}` = `{value}`")]
    UnknownParameter { key: String, value: String },

    /// Any other problem with the supplied configuration.
    #[error("error with configuration: {0}")]
    Configuration(#[source] BoxDynError),

    /// Error communicating with the database backend.
    #[error("error communicating with database: {0}")]
    Io(#[from] io::Error),

    /// Unexpected or invalid data encountered while communicating with the database.
    ///
    /// Reserved for [`Establish`](crate::driver::Establish) implementations that speak
    /// the wire protocol.
    #[error("encountered unexpected or invalid data: {0}")]
    Protocol(String),

    /// The deadline of the [`ConnectContext`](crate::context::ConnectContext) elapsed
    /// before a connection could be established.
    #[error("timed out while establishing a connection")]
    ConnectTimedOut,

    /// The [`ConnectContext`](crate::context::ConnectContext) was cancelled before a
    /// connection could be established.
    #[error("connection attempt was cancelled")]
    Cancelled,

    /// No driver is registered under the requested name.
    #[error("no driver registered under the name `{0}`")]
    DriverNotFound(String),
}

impl Error {
    #[inline]
    pub(crate) fn config(err: impl StdError + Send + Sync + 'static) -> Self {
        Error::Configuration(err.into())
    }

    /// Returns `true` if the error happened before any network activity, i.e. while
    /// resolving the connection string.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::UrlSyntax(_) | Error::UnknownParameter { .. } | Error::Configuration(_)
        )
    }
}

#[test]
fn it_formats_unknown_parameter() {
    let err = Error::UnknownParameter {
        key: "bogus".into(),
        value: "1".into(),
    };

    assert_eq!(
        err.to_string(),
        "unknown H2 server connection parameter `bogus` = `1`"
    );
    assert!(err.is_configuration());
}

#[test]
fn it_keeps_the_url_error_as_source() {
    let err = Error::UrlSyntax(url::ParseError::RelativeUrlWithoutBase);

    assert!(StdError::source(&err).is_some());
    assert!(err.to_string().starts_with("failed to parse connection url"));
}
