use env_logger::Env;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Installs the process-wide logger. A second call leaves the installed
/// logger in place and reports that through it at debug level.
pub fn init_logging() {
    let env = Env::default().default_filter_or(DEFAULT_LOG_FILTER);
    let result = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
    if let Err(err) = result {
        log::debug!("event=logging_init module=logging status=skipped error={err}");
    }
}
