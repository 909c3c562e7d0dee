//! Diagnostic logging setup
//!
//! Logs go to stderr so stdout only carries the progress table and command
//! output. `RUST_LOG` takes precedence over the verbosity flag.

use tracing_subscriber::EnvFilter;

/// Default directive for a verbosity count from `-v` flags
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "swapsort=info",
        1 => "swapsort=debug",
        _ => "swapsort=trace",
    }
}

/// Install the global subscriber. Later calls have no effect.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(0), "swapsort=info");
        assert_eq!(default_directive(1), "swapsort=debug");
        assert_eq!(default_directive(5), "swapsort=trace");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(0);
        init(2);
    }
}
