//! Config handling

use std::time::Duration;

use tracing::log::LevelFilter;

use crate::error::MemeError;

/// Chatty dependencies that only get a say when debugging.
const QUIET_MODULES: [(&str, LevelFilter); 5] = [
    ("tracing", LevelFilter::Warn),
    ("reqwest", LevelFilter::Info),
    ("hyper_util", LevelFilter::Info),
    ("h2", LevelFilter::Info),
    ("rustls", LevelFilter::Info),
];

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), MemeError> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        for (module, level) in QUIET_MODULES {
            logger = logger.with_module_level(module, level);
        }
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        MemeError::Io(std::io::Error::other(err))
    })
}

/// HTTP client shared by every upstream, with a per-request timeout.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, MemeError> {
    reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .map_err(|err| MemeError::Transport(err.to_string()))
}
