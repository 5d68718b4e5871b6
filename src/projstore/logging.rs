//! Logging setup.
//!
//! The library only emits through the `log` facade. Binaries call
//! [`init_logging`] once to install `env_logger`:
//!
//! 1. `RUST_LOG` wins when set
//! 2. `--quiet` limits output to errors
//! 3. `-v` enables debug, `-vv` trace
//! 4. Otherwise warnings and errors only
//!
//! Log lines go to stderr so command output on stdout stays parseable.

use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::io::Write;

pub fn init_logging(verbose: u8, quiet: bool) {
    let mut builder = Builder::new();

    if env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }

    if verbose > 0 {
        builder.format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.module_path().unwrap_or("projstore"),
                record.args()
            )
        });
    } else {
        builder.format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()));
    }

    // A second init (tests, embedding) keeps the first logger.
    let _ = builder.try_init();
}

fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determine_level() {
        assert_eq!(determine_level(0, false), LevelFilter::Warn);
        assert_eq!(determine_level(1, false), LevelFilter::Debug);
        assert_eq!(determine_level(3, false), LevelFilter::Trace);
        assert_eq!(determine_level(2, true), LevelFilter::Error);
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_logging(0, true);
        init_logging(1, false);
    }
}
