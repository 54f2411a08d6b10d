//! Log output for the command-line tool.

use tracing_subscriber::EnvFilter;

/// The active filter: `RUST_LOG` when set, otherwise `directives`.
pub fn env_filter(directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
}

/// Install a stderr subscriber. Call it after the env file is loaded so a
/// `RUST_LOG` set there takes effect.
pub fn init(directives: &str) {
    // a second init (tests, embedding) keeps the first subscriber
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(directives))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}
