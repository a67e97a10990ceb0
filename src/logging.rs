//! Logger initialization.
//!
//! `RUST_LOG` is read first; an explicit level passed by the caller wins over it.

use log::LevelFilter;

/// Initializes `env_logger` at `level`, clamping chatty dependencies.
///
/// Safe to call more than once: later calls are no-ops.
pub fn init_logger(level: LevelFilter) {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    builder.filter_module("html5ever", LevelFilter::Error);
    builder.filter_module("selectors", LevelFilter::Warn);
    builder.filter_module("hyper", LevelFilter::Info);
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.format_timestamp_millis();

    if builder.try_init().is_err() {
        log::debug!("logger already initialized");
    }
}

/// Level for the CLI `--verbose` switch; `fallback` applies when it is off.
pub fn level_for(verbose: bool, fallback: LevelFilter) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_maps_to_debug() {
        assert_eq!(level_for(true, LevelFilter::Warn), LevelFilter::Debug);
        assert_eq!(level_for(false, LevelFilter::Info), LevelFilter::Info);
    }

    #[test]
    fn init_twice_does_not_panic() {
        init_logger(LevelFilter::Info);
        init_logger(LevelFilter::Debug);
    }
}
