use env_logger::Env;

/// Install the logger. `RUST_LOG` overrides the default `warn` filter.
pub fn init() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp_secs()
        .init();
}
