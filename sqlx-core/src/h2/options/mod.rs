use std::borrow::Cow;
use std::fmt::{self, Debug, Display, Formatter};
use std::time::Duration;

use crate::connection::LogSettings;

mod connect;
mod parse;

/// Port the H2 TCP server listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 9092;

/// Host used when the connection string names none.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Database used when neither the path nor the `database` parameter names one.
pub const DEFAULT_DATABASE: &str = "~/test";

/// Prefix that selects an in-memory database on the server.
pub const IN_MEMORY_PREFIX: &str = "mem:";

/// Transport used to reach the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Tcp,
    Unix,
}

impl Network {
    /// `unix` selects a Unix domain socket; every other scheme, `h2` and `tcp` included,
    /// selects TCP.
    pub(crate) fn from_scheme(scheme: &str) -> Self {
        match scheme {
            "unix" => Network::Unix,
            _ => Network::Tcp,
        }
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Network::Tcp => "tcp",
            Network::Unix => "unix",
        })
    }
}

/// Options applied while dialing the server. They are not part of the connection
/// string and can only be set programmatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialOptions {
    pub(crate) connect_timeout: Option<Duration>,
    pub(crate) tcp_nodelay: bool,
}

impl Default for DialOptions {
    fn default() -> Self {
        Self {
            connect_timeout: None,
            tcp_nodelay: true,
        }
    }
}

impl DialOptions {
    pub fn get_connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    pub fn get_tcp_nodelay(&self) -> bool {
        self.tcp_nodelay
    }
}

/// Options and flags which can be used to configure an H2 connection.
///
/// Connection strings should be in one of the forms:
/// ```text
/// h2://[username[:password]@][host][:port][/database][?mem=true&logging=debug]
/// tcp://[username[:password]@][host][:port][/database][?mem=true&logging=debug]
/// unix:///path/to/socket[?database=name&mem=true&logging=debug]
/// ```
///
/// # Example
///
/// ```rust
/// # use sqlx_h2_core::error::Error;
/// # use sqlx_h2_core::h2::{H2ConnectOptions, Network};
/// let opts: H2ConnectOptions = "h2://sa:secret@db.internal:9093/sales?mem=true".parse()?;
///
/// assert_eq!(opts.get_network(), Network::Tcp);
/// assert_eq!(opts.get_address(), "db.internal:9093");
/// assert_eq!(opts.get_database(), "mem:sales");
/// assert_eq!(opts.get_username(), "sa");
/// # Ok::<(), Error>(())
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct H2ConnectOptions {
    pub(crate) network: Network,
    pub(crate) address: String,
    pub(crate) database: String,
    // the leading separator of a TCP url path, already dropped from `database`
    pub(crate) path_separator_stripped: bool,
    pub(crate) username: String,
    pub(crate) password: Option<String>,
    pub(crate) in_memory: bool,
    pub(crate) log_settings: LogSettings,
    pub(crate) dial: DialOptions,
}

impl Default for H2ConnectOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl H2ConnectOptions {
    /// Options for the default database on a server listening on the loopback
    /// interface at the default port.
    pub fn new() -> Self {
        Self {
            network: Network::Tcp,
            address: format!("{}:{}", DEFAULT_HOST, DEFAULT_PORT),
            database: String::from(DEFAULT_DATABASE),
            path_separator_stripped: false,
            username: String::new(),
            password: None,
            in_memory: false,
            log_settings: Default::default(),
            dial: Default::default(),
        }
    }

    /// Connect over TCP to `host:port`.
    pub fn host_port(mut self, host: &str, port: u16) -> Self {
        let host = if host.is_empty() { DEFAULT_HOST } else { host };
        let port = if port == 0 { DEFAULT_PORT } else { port };
        self.network = Network::Tcp;
        self.address = format!("{}:{}", host, port);
        self
    }

    /// Connect over the Unix domain socket at `path`.
    pub fn socket(mut self, path: &str) -> Self {
        self.network = Network::Unix;
        self.address = path.to_owned();
        self
    }

    pub fn username(mut self, username: &str) -> Self {
        self.username = username.to_owned();
        self
    }

    pub fn password(mut self, password: &str) -> Self {
        self.password = Some(password.to_owned());
        self
    }

    /// Sets the database name; an empty name selects [`DEFAULT_DATABASE`].
    pub fn database(mut self, database: &str) -> Self {
        self.database = if database.is_empty() {
            DEFAULT_DATABASE.to_owned()
        } else {
            database.to_owned()
        };
        self.path_separator_stripped = false;
        self
    }

    /// Open the database in the server's memory instead of on disk.
    pub fn in_memory(mut self, in_memory: bool) -> Self {
        self.in_memory = in_memory;
        self
    }

    /// Abort dialing the server once `timeout` has passed.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.dial.connect_timeout = Some(timeout);
        self
    }

    pub fn tcp_nodelay(mut self, nodelay: bool) -> Self {
        self.dial.tcp_nodelay = nodelay;
        self
    }

    pub fn get_network(&self) -> Network {
        self.network
    }

    pub fn get_address(&self) -> &str {
        &self.address
    }

    /// The database name sent to the server.
    ///
    /// For in-memory databases this is the configured name with its first path
    /// separator removed and [`IN_MEMORY_PREFIX`] prepended. The separator starting
    /// the path of a TCP url counts as that removal.
    pub fn get_database(&self) -> Cow<'_, str> {
        if self.in_memory {
            let name = if self.path_separator_stripped {
                Cow::Borrowed(&*self.database)
            } else {
                Cow::Owned(self.database.replacen('/', "", 1))
            };
            Cow::Owned(format!("{}{}", IN_MEMORY_PREFIX, name))
        } else {
            Cow::Borrowed(&self.database)
        }
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }

    pub fn get_password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn is_in_memory(&self) -> bool {
        self.in_memory
    }

    pub fn get_log_settings(&self) -> &LogSettings {
        &self.log_settings
    }

    pub fn get_dial_options(&self) -> &DialOptions {
        &self.dial
    }
}

impl Debug for H2ConnectOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("H2ConnectOptions")
            .field("network", &self.network)
            .field("address", &self.address)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("in_memory", &self.in_memory)
            .field("log_settings", &self.log_settings)
            .field("dial", &self.dial)
            .finish()
    }
}
