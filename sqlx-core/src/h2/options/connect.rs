use crate::connection::ConnectOptions;
use crate::context::ConnectContext;
use crate::error::Error;
use crate::h2::{H2ConnectOptions, H2Connection};
use futures_core::future::BoxFuture;
use log::LevelFilter;

impl ConnectOptions for H2ConnectOptions {
    type Connection = H2Connection;

    fn connect_with_context(
        &self,
        ctx: ConnectContext,
    ) -> BoxFuture<'_, Result<Self::Connection, Error>> {
        Box::pin(H2Connection::establish(self, ctx))
    }

    fn log_level(&mut self, level: LevelFilter) -> &mut Self {
        self.log_settings.log_level(level);
        self
    }

    fn disable_logging(&mut self) -> &mut Self {
        self.log_settings.disable();
        self
    }
}
