//! Tracing setup.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
///
/// The AWS SDK is noisy at `info`, so its crates stay at `warn` unless asked
/// for explicitly.
pub fn default_filter(verbose: u8) -> String {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    format!("{level},aws_config=warn,aws_smithy_runtime=warn,aws_sdk_sts=warn,hyper=warn")
}

/// Install the global subscriber, logging to stderr.
///
/// `RUST_LOG` takes precedence over `verbose`.
pub fn init(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
