use std::time::Duration;

use sqlx_h2::h2::Network;
use sqlx_h2::{ConnectContext, ConnectOptions, Connection, Error, H2ConnectOptions};
use tokio::net::TcpListener;

fn setup_if_needed() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[tokio::test]
async fn it_connects_over_tcp() -> anyhow::Result<()> {
    setup_if_needed();

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();

    let opts: H2ConnectOptions = format!("h2://sa:secret@127.0.0.1:{}/~/sales?logging=debug", port)
        .parse()?;
    let conn = opts.connect().await?;
    let (_peer, _) = listener.accept().await?;

    assert_eq!(Network::Tcp, conn.network());
    assert_eq!(format!("127.0.0.1:{}", port), conn.address());
    assert_eq!("~/sales", conn.database());
    assert!(conn.log_settings().is_enabled());

    Box::new(conn).close().await?;

    Ok(())
}

#[tokio::test]
async fn it_connects_to_in_memory_databases() -> anyhow::Result<()> {
    setup_if_needed();

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();

    let opts: H2ConnectOptions = format!("tcp://127.0.0.1:{}/scratch?mem", port).parse()?;
    let conn = opts.connect().await?;

    assert_eq!("mem:scratch", conn.database());

    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn it_connects_over_unix_sockets() -> anyhow::Result<()> {
    setup_if_needed();

    let dir = tempdir::TempDir::new("sqlx-h2")?;
    let path = dir.path().join("h2.sock");
    let listener = tokio::net::UnixListener::bind(&path)?;

    let opts: H2ConnectOptions =
        format!("unix://{}?database=inventory", path.display()).parse()?;
    assert_eq!(Network::Unix, opts.get_network());

    let conn = opts.connect().await?;
    let _peer = listener.accept().await?;

    assert_eq!(Network::Unix, conn.network());
    assert_eq!(path.to_str(), Some(conn.address()));
    assert_eq!("inventory", conn.database());

    Box::new(conn).close().await?;

    Ok(())
}

#[tokio::test]
async fn it_reports_refused_connections() -> anyhow::Result<()> {
    setup_if_needed();

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    drop(listener);

    let opts: H2ConnectOptions = format!("h2://127.0.0.1:{}/db", port).parse()?;
    let err = opts.connect().await.unwrap_err();

    assert!(matches!(err, Error::Io(_)), "{:?}", err);

    Ok(())
}

#[tokio::test]
async fn it_does_not_dial_with_a_cancelled_context() -> anyhow::Result<()> {
    setup_if_needed();

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();

    let opts: H2ConnectOptions = format!("h2://127.0.0.1:{}/db", port).parse()?;
    let (ctx, token) = ConnectContext::background().with_cancel();
    token.cancel();

    let err = opts.connect_with_context(ctx).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled), "{:?}", err);

    let accepted = tokio::time::timeout(Duration::from_millis(100), listener.accept()).await;
    assert!(accepted.is_err(), "the server should not have seen a connection");

    Ok(())
}

#[tokio::test]
async fn it_applies_builder_options() -> anyhow::Result<()> {
    setup_if_needed();

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();

    let mut opts = H2ConnectOptions::new()
        .host_port("127.0.0.1", port)
        .database("~/orders")
        .username("sa")
        .connect_timeout(Duration::from_secs(5))
        .tcp_nodelay(false);
    opts.log_level(log::LevelFilter::Trace);

    assert_eq!(Some(Duration::from_secs(5)), opts.get_dial_options().get_connect_timeout());
    assert!(!opts.get_dial_options().get_tcp_nodelay());

    let conn = opts.connect().await?;
    assert_eq!("~/orders", conn.database());
    assert!(conn.log_settings().is_enabled());

    Ok(())
}

#[test]
fn it_reads_the_url_from_the_environment() -> anyhow::Result<()> {
    std::env::set_var("DATABASE_URL", "h2://sa@db.internal:9123/~/env?mem=yes");

    let opts = H2ConnectOptions::from_env()?;

    assert_eq!("db.internal:9123", opts.get_address());
    assert_eq!("sa", opts.get_username());
    assert_eq!("mem:~/env", opts.get_database());

    Ok(())
}

#[test]
fn it_redacts_the_password_in_debug_output() -> anyhow::Result<()> {
    let opts: H2ConnectOptions = "h2://sa:hunter2@localhost/db".parse()?;

    let debug = format!("{:?}", opts);
    assert!(!debug.contains("hunter2"), "{}", debug);
    assert!(debug.contains("<redacted>"), "{}", debug);

    Ok(())
}
