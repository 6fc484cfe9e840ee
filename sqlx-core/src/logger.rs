/// Emit a driver log record, but only when the [`LogSettings`](crate::connection::LogSettings)
/// of the options or connection at hand enable `$level`.
///
/// ```text
/// h2_log!(options.log_settings, Debug, "connect to {}", options.address);
/// ```
macro_rules! h2_log {
    ($settings:expr, $level:ident, $($arg:tt)+) => {
        if $settings.enabled(log::Level::$level) {
            log::log!(target: "sqlx_h2::driver", log::Level::$level, $($arg)+);
        }
    };
}
