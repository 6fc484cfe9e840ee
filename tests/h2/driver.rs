use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{self, BoxFuture};
use sqlx_h2::h2::{Network, DEFAULT_DATABASE, DRIVER_NAME};
use sqlx_h2::{
    ConnectContext, Connection, Driver, DriverRegistry, Error, Establish,
    H2ConnectOptions, H2Driver,
};
use tokio::net::TcpListener;

fn setup_if_needed() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug)]
struct FakeConnection {
    database: String,
}

impl Connection for FakeConnection {
    fn close(self: Box<Self>) -> BoxFuture<'static, Result<(), Error>> {
        Box::pin(async { Ok(()) })
    }

    fn database(&self) -> &str {
        &self.database
    }
}

/// Records every set of options it is asked to connect with.
#[derive(Debug, Clone, Default)]
struct Recording {
    seen: Arc<Mutex<Vec<H2ConnectOptions>>>,
}

impl Recording {
    fn seen(&self) -> Vec<H2ConnectOptions> {
        self.seen.lock().unwrap().clone()
    }
}

impl Establish<H2ConnectOptions> for Recording {
    fn establish<'a>(
        &'a self,
        options: &'a H2ConnectOptions,
        _ctx: ConnectContext,
    ) -> BoxFuture<'a, Result<Box<dyn Connection>, Error>> {
        self.seen.lock().unwrap().push(options.clone());

        let conn = FakeConnection {
            database: options.get_database().into_owned(),
        };

        Box::pin(async move { Ok(Box::new(conn) as Box<dyn Connection>) })
    }
}

/// Never finishes on its own; only the context can end the attempt.
#[derive(Debug)]
struct Stall;

impl Establish<H2ConnectOptions> for Stall {
    fn establish<'a>(
        &'a self,
        _options: &'a H2ConnectOptions,
        ctx: ConnectContext,
    ) -> BoxFuture<'a, Result<Box<dyn Connection>, Error>> {
        Box::pin(async move { ctx.run(future::pending()).await })
    }
}

#[derive(Debug)]
struct Refuse;

impl Establish<H2ConnectOptions> for Refuse {
    fn establish<'a>(
        &'a self,
        _options: &'a H2ConnectOptions,
        _ctx: ConnectContext,
    ) -> BoxFuture<'a, Result<Box<dyn Connection>, Error>> {
        Box::pin(async { Err(Error::Protocol("server rejected the session".into())) })
    }
}

#[tokio::test]
async fn it_opens_with_the_parsed_options() -> anyhow::Result<()> {
    setup_if_needed();

    let recording = Recording::default();
    let driver = H2Driver::with_establish(recording.clone());

    let conn = driver.open("h2://sa:pw@host:1234/mydb?mem=true").await?;
    assert_eq!("mem:mydb", conn.database());
    conn.close().await?;

    let seen = recording.seen();
    assert_eq!(1, seen.len());
    assert_eq!(Network::Tcp, seen[0].get_network());
    assert_eq!("host:1234", seen[0].get_address());
    assert_eq!("sa", seen[0].get_username());
    assert_eq!(Some("pw"), seen[0].get_password());
    assert!(seen[0].is_in_memory());

    Ok(())
}

#[tokio::test]
async fn it_does_not_connect_when_parsing_fails() -> anyhow::Result<()> {
    setup_if_needed();

    let recording = Recording::default();
    let driver = H2Driver::with_establish(recording.clone());

    let err = driver.open("h2://host/db?bogus=1").await.unwrap_err();
    assert!(matches!(err, Error::UnknownParameter { ref key, .. } if key == "bogus"));

    let err = driver.open_connector("h2://host:nope/db").unwrap_err();
    assert!(matches!(err, Error::UrlSyntax(_)), "{:?}", err);

    assert!(recording.seen().is_empty());

    Ok(())
}

#[tokio::test]
async fn it_reuses_a_connector_without_reparsing() -> anyhow::Result<()> {
    setup_if_needed();

    let recording = Recording::default();
    let driver = H2Driver::with_establish(recording.clone());
    let connector = driver.open_connector("unix:///run/h2.sock")?;

    for _ in 0..3 {
        let conn = connector.connect(ConnectContext::background()).await?;
        assert_eq!(DEFAULT_DATABASE, conn.database());
    }

    let seen = recording.seen();
    assert_eq!(3, seen.len());
    assert!(seen.iter().all(|opts| *opts == seen[0]));
    assert_eq!(Network::Unix, seen[0].get_network());
    assert_eq!("/run/h2.sock", seen[0].get_address());

    Ok(())
}

#[tokio::test]
async fn it_exposes_the_driver_of_a_connector() -> anyhow::Result<()> {
    let connector = H2Driver::new().open_connector("h2://host/db")?;

    assert_eq!(DRIVER_NAME, connector.driver().name());

    // the retained driver can parse on its own
    let again = connector.driver().open_connector("h2://other/db")?;
    assert_eq!(DRIVER_NAME, again.driver().name());

    Ok(())
}

#[tokio::test]
async fn it_forwards_cancellation_to_establish() -> anyhow::Result<()> {
    setup_if_needed();

    let connector = H2Driver::with_establish(Stall).open_connector("h2://host/db")?;
    let (ctx, token) = ConnectContext::background().with_cancel();

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });

    let err = connector.connect(ctx).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled), "{:?}", err);

    canceller.await?;

    Ok(())
}

#[tokio::test]
async fn it_forwards_deadlines_to_establish() -> anyhow::Result<()> {
    setup_if_needed();

    let connector = H2Driver::with_establish(Stall).open_connector("h2://host/db")?;
    let ctx = ConnectContext::background().with_timeout(Duration::from_millis(20));

    let err = connector.connect(ctx).await.unwrap_err();
    assert!(matches!(err, Error::ConnectTimedOut), "{:?}", err);

    Ok(())
}

#[tokio::test]
async fn it_propagates_establish_errors_unchanged() -> anyhow::Result<()> {
    setup_if_needed();

    let driver = H2Driver::with_establish(Refuse);

    let err = driver.open("h2://host/db").await.unwrap_err();
    assert!(
        matches!(err, Error::Protocol(ref msg) if msg == "server rejected the session"),
        "{:?}",
        err
    );

    let err = driver
        .open_connector("h2://host/db")?
        .connect(ConnectContext::background())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Protocol(_)), "{:?}", err);

    Ok(())
}

#[tokio::test]
async fn it_opens_through_an_explicit_registry() -> anyhow::Result<()> {
    setup_if_needed();

    let recording = Recording::default();
    let registry = DriverRegistry::new();
    assert!(registry.register(DRIVER_NAME, H2Driver::with_establish(recording.clone())));
    assert!(!registry.register(DRIVER_NAME, H2Driver::new()));

    let conn = registry.open(DRIVER_NAME, "h2:///db").await?;
    assert_eq!("db", conn.database());
    assert_eq!("127.0.0.1:9092", recording.seen()[0].get_address());

    let err = registry.open("mysql", "mysql://host/db").await.unwrap_err();
    assert!(matches!(err, Error::DriverNotFound(ref name) if name == "mysql"));

    Ok(())
}

#[tokio::test]
async fn it_opens_through_the_global_registry() -> anyhow::Result<()> {
    setup_if_needed();

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();

    let conn = sqlx_h2::open(DRIVER_NAME, &format!("h2://127.0.0.1:{}/~/global", port)).await?;
    assert_eq!("~/global", conn.database());
    conn.close().await?;

    let connector =
        sqlx_h2::open_connector(DRIVER_NAME, &format!("h2://127.0.0.1:{}/~/global", port))?;
    let conn = connector.connect(ConnectContext::background()).await?;
    conn.close().await?;

    assert!(sqlx_h2::driver::global().names().contains(&DRIVER_NAME.to_owned()));

    Ok(())
}
