//! Tracing setup

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
pub fn default_directives(debug: bool) -> &'static str {
    if debug {
        "warn,rtest=debug,rtest_core=debug"
    } else {
        "warn,rtest=info,rtest_core=info"
    }
}

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` wins over `--rtest-debug` when both are given.
pub fn init(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(debug)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_raises_own_targets_only() {
        assert!(default_directives(true).contains("rtest_core=debug"));
        assert!(default_directives(true).starts_with("warn"));
        assert!(!default_directives(false).contains("debug"));
    }

    #[test]
    fn test_directives_parse() {
        assert!(EnvFilter::try_new(default_directives(true)).is_ok());
        assert!(EnvFilter::try_new(default_directives(false)).is_ok());
    }
}
