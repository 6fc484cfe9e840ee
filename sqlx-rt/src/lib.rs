//! Core runtime support for sqlx-h2. Not intended to be used directly.

#[cfg(not(any(feature = "_rt-tokio", feature = "_rt-async-std")))]
compile_error!(
    "one of the features ['runtime-tokio', 'runtime-async-std'] \
     must be enabled"
);

//
// tokio
//

#[cfg(feature = "_rt-tokio")]
pub use tokio::{self, io::AsyncWriteExt, net::TcpStream, time::sleep, time::timeout};

#[cfg(all(unix, feature = "_rt-tokio"))]
pub use tokio::net::UnixStream;

#[cfg(feature = "_rt-tokio")]
pub static TOKIO_RT: once_cell::sync::Lazy<tokio::runtime::Runtime> =
    once_cell::sync::Lazy::new(|| {
        tokio::runtime::Builder::new_current_thread()
            .enable_io()
            .enable_time()
            .build()
            .expect("failed to initialize Tokio runtime")
    });

#[cfg(feature = "_rt-tokio")]
pub fn test_block_on<F: std::future::Future>(future: F) -> F::Output {
    TOKIO_RT.block_on(future)
}

//
// async-std
//

#[cfg(all(feature = "_rt-async-std", not(feature = "_rt-tokio")))]
pub use async_std::{
    self, future::timeout, net::TcpStream, task::block_on as test_block_on, task::sleep,
};

#[cfg(all(unix, feature = "_rt-async-std", not(feature = "_rt-tokio")))]
pub use async_std::os::unix::net::UnixStream;
