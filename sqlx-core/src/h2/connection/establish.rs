use crate::context::ConnectContext;
use crate::error::Error;
use crate::h2::options::Network;
use crate::h2::{H2ConnectOptions, H2Connection};
use crate::net::Socket;

impl H2Connection {
    pub(crate) async fn establish(
        options: &H2ConnectOptions,
        ctx: ConnectContext,
    ) -> Result<Self, Error> {
        let ctx = match options.dial.connect_timeout {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx,
        };

        h2_log!(
            options.log_settings,
            Debug,
            "dialing {} over {}",
            options.address,
            options.network
        );

        let socket = match options.network {
            Network::Tcp => {
                ctx.run(async {
                    Socket::connect_tcp(&options.address, options.dial.tcp_nodelay)
                        .await
                        .map_err(Error::Io)
                })
                .await?
            }

            #[cfg(unix)]
            Network::Unix => {
                ctx.run(async { Socket::connect_uds(&options.address).await.map_err(Error::Io) })
                    .await?
            }

            #[cfg(not(unix))]
            Network::Unix => {
                return Err(Error::Configuration(
                    "Unix domain sockets are not supported on this platform".into(),
                ));
            }
        };

        let database = options.get_database().into_owned();

        h2_log!(
            options.log_settings,
            Info,
            "connected to {} (database {})",
            options.address,
            database
        );

        Ok(Self {
            socket,
            network: options.network,
            address: options.address.clone(),
            database,
            log_settings: options.log_settings.clone(),
        })
    }
}
