#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub use sqlx_core::connection::{ConnectOptions, Connection, LogSettings};
pub use sqlx_core::context::{CancelToken, ConnectContext};
pub use sqlx_core::driver::{
    self, install_default_drivers, Connector, Driver, DriverRegistry, Establish,
};
pub use sqlx_core::error::{self, BoxDynError, Error, Result};
pub use sqlx_core::h2::{self, H2ConnectOptions, H2Connection, H2Connector, H2Driver};

/// Open a connection to `url` with the driver registered under `name` in the global
/// registry, registering the built-in drivers first if needed.
///
/// ```rust,no_run
/// # async fn example() -> sqlx_h2::Result<()> {
/// use sqlx_h2::Connection;
///
/// let conn = sqlx_h2::open("h2", "h2://sa@localhost/~/sales?logging=info").await?;
/// println!("connected to {}", conn.database());
/// conn.close().await?;
/// # Ok(())
/// # }
/// ```
pub async fn open(name: &str, url: &str) -> Result<Box<dyn Connection>> {
    install_default_drivers();
    driver::global().open(name, url).await
}

/// Create a connector for `url` with the driver registered under `name` in the global
/// registry, registering the built-in drivers first if needed.
pub fn open_connector(name: &str, url: &str) -> Result<Box<dyn Connector>> {
    install_default_drivers();
    driver::global().open_connector(name, url)
}
