use crate::context::ConnectContext;
use crate::error::Error;
use futures_core::future::BoxFuture;
use log::{Level, LevelFilter};
use std::fmt::Debug;
use std::str::FromStr;

/// Represents a single database connection.
pub trait Connection: Send + Debug + 'static {
    /// Explicitly close this database connection.
    ///
    /// This method is **not required** for safe and consistent operation. However, it is
    /// recommended to call it instead of letting a connection `drop` as the database backend
    /// will be faster at cleaning up resources.
    fn close(self: Box<Self>) -> BoxFuture<'static, Result<(), Error>>;

    /// The database this connection was opened against.
    fn database(&self) -> &str;
}

/// Logging configuration carried by a set of connect options and every connection
/// created from them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogSettings {
    pub(crate) enabled: bool,
    pub(crate) level: LevelFilter,
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            enabled: false,
            level: LevelFilter::Info,
        }
    }
}

impl LogSettings {
    pub(crate) fn log_level(&mut self, level: LevelFilter) {
        self.enabled = true;
        self.level = level;
    }

    pub(crate) fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// Returns `true` if a record at `level` should be emitted under these settings.
    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        self.enabled && level <= self.level
    }
}

pub trait ConnectOptions: Sized + Send + Sync + Clone + Debug + 'static {
    type Connection: Connection;

    fn from_url(url: &str) -> Result<Self, Error>
    where
        Self: FromStr<Err = Error>,
    {
        Self::from_str(url)
    }

    /// Parse the options from `DATABASE_URL`, loading a `.env` file first if one exists.
    fn from_env() -> Result<Self, Error>
    where
        Self: FromStr<Err = Error>,
    {
        let url = dotenvy::var("DATABASE_URL").map_err(Error::config)?;
        Self::from_str(&url)
    }

    /// Establish a new connection that can neither be cancelled nor time out, apart from
    /// any dial timeout configured on the options themselves.
    fn connect(&self) -> BoxFuture<'_, Result<Self::Connection, Error>> {
        self.connect_with_context(ConnectContext::background())
    }

    /// Establish a new connection, aborting when `ctx` is cancelled or its deadline passes.
    fn connect_with_context(
        &self,
        ctx: ConnectContext,
    ) -> BoxFuture<'_, Result<Self::Connection, Error>>;

    /// Enable logging for connections made with these options, at `level` and above.
    fn log_level(&mut self, level: LevelFilter) -> &mut Self;

    fn disable_logging(&mut self) -> &mut Self;
}

#[test]
fn it_gates_records_by_level() {
    let mut settings = LogSettings::default();
    assert!(!settings.enabled(Level::Error));

    settings.log_level(LevelFilter::Warn);
    assert!(settings.enabled(Level::Error));
    assert!(settings.enabled(Level::Warn));
    assert!(!settings.enabled(Level::Info));

    settings.disable();
    assert!(!settings.enabled(Level::Error));
    assert_eq!(settings.level(), LevelFilter::Warn);
}
