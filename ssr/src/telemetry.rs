use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use tracing_subscriber::util::TryInitError;

/// Used when `RUST_LOG` is unset or unparsable
pub const DEFAULT_LEVEL: &str = "info,leaderboard_web=info,component=info";

/// Install the global subscriber.
///
/// Logs go to stderr so they don't interleave with the table on stdout.
/// Records from the `log` facade are forwarded as well.
pub fn init_telemetry() -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
}
