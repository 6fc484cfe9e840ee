use std::fmt::{self, Debug, Formatter};

use futures_core::future::BoxFuture;

use crate::connection::{Connection, LogSettings};
use crate::error::Error;
use crate::h2::options::Network;
use crate::net::Socket;

mod establish;

/// A transport-level connection to an H2 server.
pub struct H2Connection {
    socket: Socket,
    network: Network,
    address: String,
    database: String,
    log_settings: LogSettings,
}

impl H2Connection {
    pub fn network(&self) -> Network {
        self.network
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn log_settings(&self) -> &LogSettings {
        &self.log_settings
    }

    /// The underlying transport, for the wire protocol layered on top of it.
    pub fn socket_mut(&mut self) -> &mut Socket {
        &mut self.socket
    }
}

impl Debug for H2Connection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("H2Connection")
            .field("network", &self.network)
            .field("address", &self.address)
            .field("database", &self.database)
            .finish()
    }
}

impl Connection for H2Connection {
    fn close(mut self: Box<Self>) -> BoxFuture<'static, Result<(), Error>> {
        Box::pin(async move {
            h2_log!(self.log_settings, Debug, "close connection to {}", self.address);
            self.socket.shutdown().await
        })
    }

    fn database(&self) -> &str {
        &self.database
    }
}
