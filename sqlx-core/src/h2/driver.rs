use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use futures_core::future::BoxFuture;

use crate::connection::Connection;
use crate::context::ConnectContext;
use crate::driver::{Connector, Driver, Establish};
use crate::error::Error;
use crate::h2::{H2ConnectOptions, H2Connection};

/// The name [`H2Driver`] registers itself under.
pub const DRIVER_NAME: &str = "h2";

/// Establishes connections by dialing the server described by the options.
#[derive(Debug, Default, Clone, Copy)]
pub struct SocketEstablish;

impl Establish<H2ConnectOptions> for SocketEstablish {
    fn establish<'a>(
        &'a self,
        options: &'a H2ConnectOptions,
        ctx: ConnectContext,
    ) -> BoxFuture<'a, Result<Box<dyn Connection>, Error>> {
        Box::pin(async move {
            let conn = H2Connection::establish(options, ctx).await?;
            Ok(Box::new(conn) as Box<dyn Connection>)
        })
    }
}

/// Driver for H2 database servers.
///
/// ```rust,no_run
/// # async fn example() -> Result<(), sqlx_h2_core::error::Error> {
/// use sqlx_h2_core::connection::Connection;
/// use sqlx_h2_core::context::ConnectContext;
/// use sqlx_h2_core::driver::{Connector, Driver};
/// use sqlx_h2_core::h2::H2Driver;
/// use std::time::Duration;
///
/// let driver = H2Driver::new();
/// let connector = driver.open_connector("h2://sa@localhost/~/sales")?;
///
/// let ctx = ConnectContext::background().with_timeout(Duration::from_secs(5));
/// let conn = connector.connect(ctx).await?;
/// conn.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct H2Driver {
    establish: Arc<dyn Establish<H2ConnectOptions>>,
}

impl H2Driver {
    /// A driver that dials the server over TCP or a Unix domain socket.
    pub fn new() -> Self {
        Self::with_establish(SocketEstablish)
    }

    /// A driver that hands resolved options to `establish` instead of dialing itself.
    pub fn with_establish(establish: impl Establish<H2ConnectOptions>) -> Self {
        Self {
            establish: Arc::new(establish),
        }
    }

    /// Like [`Driver::open_connector`], without erasing the connector type.
    pub fn connector(&self, url: &str) -> Result<H2Connector, Error> {
        let options: H2ConnectOptions = url.parse()?;
        h2_log!(options.log_settings, Debug, "open connector");

        Ok(H2Connector {
            options,
            driver: self.clone(),
        })
    }
}

impl Default for H2Driver {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for H2Driver {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("H2Driver")
            .field("establish", &self.establish)
            .finish()
    }
}

impl Driver for H2Driver {
    fn name(&self) -> &'static str {
        DRIVER_NAME
    }

    fn open<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Box<dyn Connection>, Error>> {
        Box::pin(async move {
            let options: H2ConnectOptions = url.parse()?;

            h2_log!(options.log_settings, Info, "open");
            h2_log!(
                options.log_settings,
                Debug,
                "open {} database {}",
                options.address,
                options.get_database()
            );

            self.establish
                .establish(&options, ConnectContext::background())
                .await
        })
    }

    fn open_connector(&self, url: &str) -> Result<Box<dyn Connector>, Error> {
        Ok(Box::new(self.connector(url)?))
    }
}

/// A parsed connection string bound to the [`H2Driver`] that parsed it.
#[derive(Debug, Clone)]
pub struct H2Connector {
    options: H2ConnectOptions,
    driver: H2Driver,
}

impl H2Connector {
    pub fn options(&self) -> &H2ConnectOptions {
        &self.options
    }
}

impl Connector for H2Connector {
    fn connect(&self, ctx: ConnectContext) -> BoxFuture<'_, Result<Box<dyn Connection>, Error>> {
        h2_log!(self.options.log_settings, Debug, "connect");
        self.driver.establish.establish(&self.options, ctx)
    }

    fn driver(&self) -> &dyn Driver {
        h2_log!(self.options.log_settings, Trace, "driver");
        &self.driver
    }
}
