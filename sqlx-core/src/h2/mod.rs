//! **H2** database driver.

mod connection;
mod driver;
mod options;

pub use connection::H2Connection;
pub use driver::{H2Connector, H2Driver, SocketEstablish, DRIVER_NAME};
pub use options::{
    DialOptions, H2ConnectOptions, Network, DEFAULT_DATABASE, DEFAULT_HOST, DEFAULT_PORT,
    IN_MEMORY_PREFIX,
};
