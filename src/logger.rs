use log::LevelFilter;

/// Maps the number of `-v` flags given on the command line to a log level.
///
/// Warnings are always shown; each flag raises the level by one step, up to
/// `trace`.
pub fn level_for(verbosity: u64) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Initializes the global logger at `level`.
///
/// Module filters in `RUST_LOG` still apply. Calling this twice leaves the
/// first logger in place.
pub fn init_logger(level: LevelFilter) {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp_millis()
        .try_init();
}

#[test]
fn verbosity_raises_log_level() {
    assert_eq!(level_for(0), LevelFilter::Warn);
    assert_eq!(level_for(1), LevelFilter::Info);
    assert_eq!(level_for(2), LevelFilter::Debug);
    assert_eq!(level_for(3), LevelFilter::Trace);
    assert_eq!(level_for(42), LevelFilter::Trace);
}
