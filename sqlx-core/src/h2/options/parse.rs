use crate::error::Error;
use crate::h2::options::Network;
use crate::h2::H2ConnectOptions;
use log::LevelFilter;
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::str::FromStr;
use url::Url;

#[cfg(test)]
use crate::h2::options::{DEFAULT_DATABASE, DEFAULT_HOST, DEFAULT_PORT};

impl FromStr for H2ConnectOptions {
    type Err = Error;

    /// Parse a connection string into a set of connection options.
    ///
    /// The connection string should be a valid URL with one of the following formats:
    /// ```text
    /// h2://[username[:password]@][host][:port][/database][?param1=value1&param2=value2...]
    /// unix:///path/to/socket[?database=name&param1=value1...]
    /// ```
    ///
    /// Components:
    /// - `scheme`: `unix` connects through a Unix domain socket, anything else (`h2`, `tcp`) over TCP.
    /// - `username`: The username for the H2 server.
    /// - `password`: The password for the H2 server.
    /// - `host`: The hostname or IP address of the server (default is `127.0.0.1`).
    /// - `port`: The port number (default is 9092, also used for port 0).
    /// - `database`: The path of the database on the server (default is `~/test`).
    ///
    /// Supported query parameters (keys are case-insensitive):
    /// - `mem`: empty, `1`, `yes` or `true` opens an in-memory database.
    /// - `logging`: `none`, `info`, `debug`, `error`, `warning`, `panic` or `trace`. Enables
    ///   driver logging for connections made with these options at the given level, or
    ///   disables it for `none`. `panic` logs at error level. `warn` is accepted but changes
    ///   nothing; use `warning`.
    /// - `database`: the database for `unix` connections; ignored for TCP.
    ///
    /// Any other parameter is rejected with [`Error::UnknownParameter`].
    ///
    /// Example:
    /// ```text
    /// h2://sa:secret@localhost:9092/~/sales?logging=debug
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        log::trace!("parsing H2 connection url");

        let url: Url = s.parse().map_err(Error::UrlSyntax)?;
        let mut options = Self::new();

        options.network = Network::from_scheme(url.scheme());

        match options.network {
            Network::Unix => {
                let path = decode(url.path())?;
                if path.is_empty() {
                    return Err(Error::Configuration(
                        "unix connection string has an empty socket path".into(),
                    ));
                }

                options = options.socket(&path);

                if let Some((_, database)) = url
                    .query_pairs()
                    .find(|(key, _)| key.eq_ignore_ascii_case("database"))
                {
                    options = options.database(&database);
                }
            }

            Network::Tcp => {
                // IPv6 literals keep their brackets so the address stays dialable
                let host = url.host_str().unwrap_or_default();
                options = options.host_port(host, url.port().unwrap_or_default());

                let path = decode(url.path())?;
                match path.strip_prefix('/') {
                    Some(name) if !name.is_empty() => {
                        options = options.database(name);
                        options.path_separator_stripped = true;
                    }
                    Some(_) => {}
                    None => options = options.database(&path),
                }
            }
        }

        let username = url.username();
        if !username.is_empty() {
            options = options.username(&decode(username)?);
        }

        if let Some(password) = url.password() {
            options = options.password(&decode(password)?);
        }

        // the first `mem` wins; applied once so the result does not depend on parameter order
        let mut in_memory = None;

        for (key, value) in url.query_pairs() {
            let value = value.trim();

            match &*key.to_ascii_lowercase() {
                "mem" => {
                    in_memory.get_or_insert(matches!(value, "" | "1" | "yes" | "true"));
                }

                "logging" => match &*value.to_ascii_lowercase() {
                    "none" => options.log_settings.disable(),
                    "info" => options.log_settings.log_level(LevelFilter::Info),
                    "debug" => options.log_settings.log_level(LevelFilter::Debug),
                    "error" => options.log_settings.log_level(LevelFilter::Error),
                    // accepted without effect; only `warning` selects the warn level
                    "warn" => {}
                    "warning" => options.log_settings.log_level(LevelFilter::Warn),
                    "panic" => options.log_settings.log_level(LevelFilter::Error),
                    "trace" => options.log_settings.log_level(LevelFilter::Trace),
                    other => {
                        log::debug!("ignoring unrecognized H2 logging level {:?}", other);
                    }
                },

                "database" => {}

                _ => {
                    return Err(Error::UnknownParameter {
                        key: key.into_owned(),
                        value: value.to_owned(),
                    });
                }
            }
        }

        if let Some(in_memory) = in_memory {
            options = options.in_memory(in_memory);
        }

        Ok(options)
    }
}

fn decode(s: &str) -> Result<Cow<'_, str>, Error> {
    percent_decode_str(s).decode_utf8().map_err(Error::config)
}

#[test]
fn it_parses_host_port_and_database() {
    let opts: H2ConnectOptions = "h2://host:1234/mydb".parse().unwrap();

    assert_eq!(Network::Tcp, opts.network);
    assert_eq!("host:1234", opts.address);
    assert_eq!("mydb", opts.get_database());
    assert!(!opts.in_memory);
}

#[test]
fn it_defaults_host_and_port() {
    let opts: H2ConnectOptions = "h2:///mydb".parse().unwrap();

    assert_eq!(format!("{}:{}", DEFAULT_HOST, DEFAULT_PORT), opts.address);
    assert_eq!("mydb", opts.database);
}

#[test]
fn it_treats_port_zero_as_default() {
    let opts: H2ConnectOptions = "tcp://example.com:0/db".parse().unwrap();

    assert_eq!("example.com:9092", opts.address);
}

#[test]
fn it_keeps_ipv6_brackets() {
    let opts: H2ConnectOptions = "h2://[::1]:9000/db".parse().unwrap();

    assert_eq!("[::1]:9000", opts.address);
}

#[test]
fn it_maps_every_non_unix_scheme_to_tcp() {
    for url in ["h2://host/db", "tcp://host/db", "jdbc://host/db"] {
        let opts: H2ConnectOptions = url.parse().unwrap();
        assert_eq!(Network::Tcp, opts.network, "{}", url);
        assert_eq!("host:9092", opts.address, "{}", url);
    }
}

#[test]
fn it_parses_in_memory_databases() {
    let opts: H2ConnectOptions = "h2://host/db?mem=true".parse().unwrap();

    assert!(opts.in_memory);
    assert_eq!("mem:db", opts.get_database());
}

#[test]
fn it_accepts_every_in_memory_spelling() {
    for value in ["", "1", "yes", "true", " true "] {
        let url = format!("h2://host/db?MEM={}", value);
        let opts: H2ConnectOptions = url.parse().unwrap();
        assert!(opts.in_memory, "{}", url);
    }

    for value in ["0", "no", "TRUE", "on"] {
        let url = format!("h2://host/db?mem={}", value);
        let opts: H2ConnectOptions = url.parse().unwrap();
        assert!(!opts.in_memory, "{}", url);
        assert_eq!("db", opts.get_database(), "{}", url);
    }
}

#[test]
fn it_applies_the_in_memory_prefix_once() {
    let opts: H2ConnectOptions = "h2://host/db?mem=true&mem=1&Mem=yes".parse().unwrap();

    assert_eq!("mem:db", opts.get_database());
}

#[test]
fn it_parses_unix_sockets() {
    let opts: H2ConnectOptions = "unix:///tmp/sock?database=foo".parse().unwrap();

    assert_eq!(Network::Unix, opts.network);
    assert_eq!("/tmp/sock", opts.address);
    assert_eq!("foo", opts.get_database());
}

#[test]
fn it_prefixes_unix_in_memory_databases() {
    let opts: H2ConnectOptions = "unix:///tmp/sock?database=/foo&mem".parse().unwrap();

    assert_eq!("mem:foo", opts.get_database());
}

#[test]
fn it_removes_one_separator_for_in_memory_databases() {
    let cases = [
        ("h2://host?mem=true", "mem:~test"),
        ("h2://host/?mem", "mem:~test"),
        ("unix:///tmp/s?mem", "mem:~test"),
        ("h2://host//a/b?mem=true", "mem:/a/b"),
        ("h2://host/~/sales?mem", "mem:~/sales"),
        ("unix:///tmp/s?database=a/b&mem", "mem:ab"),
    ];

    for (url, database) in cases {
        let opts: H2ConnectOptions = url.parse().unwrap();
        assert_eq!(database, opts.get_database(), "{}", url);
    }

    let opts = H2ConnectOptions::new().database("/a/b").in_memory(true);
    assert_eq!("mem:a/b", opts.get_database());
}

#[test]
fn it_rejects_empty_unix_socket_paths() {
    let err = "unix://?database=foo".parse::<H2ConnectOptions>().unwrap_err();

    assert!(matches!(err, Error::Configuration(_)), "{:?}", err);
}

#[test]
fn it_falls_back_to_the_default_database() {
    let tcp: H2ConnectOptions = "h2://host".parse().unwrap();
    let tcp_slash: H2ConnectOptions = "h2://host/".parse().unwrap();
    let unix: H2ConnectOptions = "unix:///tmp/sock".parse().unwrap();
    let unix_empty: H2ConnectOptions = "unix:///tmp/sock?database=".parse().unwrap();

    assert_eq!(DEFAULT_DATABASE, tcp.database);
    assert_eq!(DEFAULT_DATABASE, tcp_slash.database);
    assert_eq!(DEFAULT_DATABASE, unix.database);
    assert_eq!(DEFAULT_DATABASE, unix_empty.database);
}

#[test]
fn it_ignores_the_database_parameter_over_tcp() {
    let opts: H2ConnectOptions = "h2://host/db?database=other".parse().unwrap();

    assert_eq!("db", opts.database);
}

#[test]
fn it_parses_credentials() {
    let opts: H2ConnectOptions = "h2://user:pass@host/db".parse().unwrap();

    assert_eq!("user", opts.username);
    assert_eq!(Some("pass"), opts.password.as_deref());

    let opts: H2ConnectOptions = "h2://user@host/db".parse().unwrap();

    assert_eq!("user", opts.username);
    assert_eq!(None, opts.password);
}

#[test]
fn it_parses_password_with_non_ascii_chars_correctly() {
    let opts: H2ConnectOptions = "h2://username:p%40ss%C3%A9@hostname/db".parse().unwrap();

    assert_eq!(Some("p@ssé"), opts.password.as_deref());
}

#[test]
fn it_decodes_the_database_path() {
    let opts: H2ConnectOptions = "h2://host/~/my%20db".parse().unwrap();

    assert_eq!("~/my db", opts.database);
}

#[test]
fn it_rejects_unknown_parameters() {
    let err = "h2://host/db?bogus=1".parse::<H2ConnectOptions>().unwrap_err();

    match err {
        Error::UnknownParameter { key, value } => {
            assert_eq!("bogus", key);
            assert_eq!("1", value);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn it_rejects_malformed_urls() {
    let err = "not a url".parse::<H2ConnectOptions>().unwrap_err();
    assert!(matches!(err, Error::UrlSyntax(_)), "{:?}", err);

    let err = "h2://host:port/db".parse::<H2ConnectOptions>().unwrap_err();
    assert!(matches!(err, Error::UrlSyntax(_)), "{:?}", err);
}

#[test]
fn it_configures_logging() {
    let cases = [
        ("info", LevelFilter::Info),
        ("debug", LevelFilter::Debug),
        ("error", LevelFilter::Error),
        ("warning", LevelFilter::Warn),
        ("panic", LevelFilter::Error),
        ("TRACE", LevelFilter::Trace),
    ];

    for (value, level) in cases {
        let url = format!("h2://host/db?logging={}", value);
        let opts: H2ConnectOptions = url.parse().unwrap();
        assert!(opts.log_settings.is_enabled(), "{}", url);
        assert_eq!(level, opts.log_settings.level(), "{}", url);
    }

    let opts: H2ConnectOptions = "h2://host/db?logging=none".parse().unwrap();
    assert!(!opts.log_settings.is_enabled());
}

#[test]
fn it_trims_logging_values() {
    let opts: H2ConnectOptions = "h2://host/db?logging=%20debug%20".parse().unwrap();
    assert!(opts.log_settings.is_enabled());
    assert_eq!(LevelFilter::Debug, opts.log_settings.level());
}

#[test]
fn it_leaves_logging_unchanged_for_warn() {
    let opts: H2ConnectOptions = "h2://host/db?logging=warn".parse().unwrap();
    assert_eq!(H2ConnectOptions::new().log_settings, opts.log_settings);

    let opts: H2ConnectOptions = "h2://host/db?logging=debug&logging=warn".parse().unwrap();
    assert!(opts.log_settings.is_enabled());
    assert_eq!(LevelFilter::Debug, opts.log_settings.level());
}

#[test]
fn it_lets_the_last_logging_parameter_win() {
    let opts: H2ConnectOptions = "h2://host/db?logging=trace&LOGGING=none".parse().unwrap();
    assert!(!opts.log_settings.is_enabled());

    let opts: H2ConnectOptions = "h2://host/db?logging=none&logging=error".parse().unwrap();
    assert!(opts.log_settings.is_enabled());
    assert_eq!(LevelFilter::Error, opts.log_settings.level());
}

#[test]
fn it_parses_the_same_url_to_equal_options() {
    let url = "h2://user:pass@host:9000/db?mem=1&logging=debug";

    assert_eq!(
        url.parse::<H2ConnectOptions>().unwrap(),
        url.parse::<H2ConnectOptions>().unwrap()
    );
}
