use crate::error::Error;
use std::io;

#[cfg(unix)]
use std::path::Path;

#[cfg(all(feature = "_rt-async-std", not(feature = "_rt-tokio")))]
use std::net::Shutdown;

#[cfg(not(all(feature = "_rt-async-std", not(feature = "_rt-tokio"))))]
use sqlx_rt::AsyncWriteExt;

use sqlx_rt::TcpStream;

/// A transport to the database server.
#[derive(Debug)]
pub enum Socket {
    Tcp(TcpStream),

    #[cfg(unix)]
    Unix(sqlx_rt::UnixStream),
}

impl Socket {
    pub async fn connect_tcp(address: &str, nodelay: bool) -> io::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        stream.set_nodelay(nodelay)?;

        Ok(Socket::Tcp(stream))
    }

    #[cfg(unix)]
    pub async fn connect_uds(path: impl AsRef<Path>) -> io::Result<Self> {
        sqlx_rt::UnixStream::connect(path.as_ref())
            .await
            .map(Socket::Unix)
    }

    pub async fn shutdown(&mut self) -> Result<(), Error> {
        #[cfg(all(feature = "_rt-async-std", not(feature = "_rt-tokio")))]
        {
            match self {
                Socket::Tcp(s) => s.shutdown(Shutdown::Both)?,

                #[cfg(unix)]
                Socket::Unix(s) => s.shutdown(Shutdown::Both)?,
            }

            Ok(())
        }

        #[cfg(not(all(feature = "_rt-async-std", not(feature = "_rt-tokio"))))]
        {
            match self {
                Socket::Tcp(s) => s.shutdown().await?,

                #[cfg(unix)]
                Socket::Unix(s) => s.shutdown().await?,
            }

            Ok(())
        }
    }
}
