//! Capability traits connecting a generic SQL access layer to a database driver.
//!
//! A [`Driver`] turns a connection string into either a [`Connection`] (one shot) or a
//! [`Connector`] that can produce any number of connections from the same resolved
//! options. Drivers are looked up by name through a [`DriverRegistry`].

use std::fmt::Debug;
use std::sync::Once;

use futures_core::future::BoxFuture;

use crate::connection::Connection;
use crate::context::ConnectContext;
use crate::error::Error;

mod registry;

pub use registry::{global, DriverRegistry};

/// A database driver, discoverable by name.
pub trait Driver: Send + Sync + Debug + 'static {
    /// The name the driver registers itself under.
    fn name(&self) -> &'static str;

    /// Parse `url` and immediately establish a connection with it.
    ///
    /// The attempt cannot be cancelled; use [`open_connector`](Self::open_connector) and
    /// [`Connector::connect`] to pass a [`ConnectContext`].
    fn open<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Box<dyn Connection>, Error>>;

    /// Parse `url` into a [`Connector`] that can establish connections repeatedly
    /// without parsing it again.
    fn open_connector(&self, url: &str) -> Result<Box<dyn Connector>, Error>;
}

/// A resolved set of connection options bound to the driver that parsed them.
pub trait Connector: Send + Sync + Debug {
    /// Establish a new connection. `ctx` is forwarded into connection establishment, so
    /// cancelling it or reaching its deadline aborts an in-flight attempt.
    fn connect(&self, ctx: ConnectContext) -> BoxFuture<'_, Result<Box<dyn Connection>, Error>>;

    /// The driver that created this connector.
    fn driver(&self) -> &dyn Driver;
}

/// Turns resolved connection options into a live connection.
///
/// This is the seam between connection-string handling and the wire protocol. Errors
/// are returned to the caller of `open` or `connect` unchanged.
pub trait Establish<O>: Send + Sync + Debug + 'static {
    fn establish<'a>(
        &'a self,
        options: &'a O,
        ctx: ConnectContext,
    ) -> BoxFuture<'a, Result<Box<dyn Connection>, Error>>;
}

/// Register the drivers shipped with this crate in the [`global`] registry.
///
/// Safe to call any number of times; registration happens once.
pub fn install_default_drivers() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let driver = crate::h2::H2Driver::new();
        log::trace!("registering driver {}", driver.name());
        global().register(crate::h2::DRIVER_NAME, driver);
    });
}
