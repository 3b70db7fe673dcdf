//! Config handling

use tracing::log::LevelFilter;

/// Log levels for this crate and for everything it depends on.
fn log_levels(debug: bool) -> (LevelFilter, LevelFilter) {
    if debug {
        (LevelFilter::Debug, LevelFilter::Info)
    } else {
        (LevelFilter::Info, LevelFilter::Warn)
    }
}

/// Sets up logging based on the debug flag.
///
/// `debug` turns on this crate's request and model-call traces; dependency
/// chatter (HTTP client, TLS, sessions) only goes as far as info.
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let (own, dependencies) = log_levels(debug);

    simple_logger::SimpleLogger::new()
        .with_level(dependencies)
        .with_module_level(env!("CARGO_CRATE_NAME"), own)
        .init()
        .map_err(|err| {
            eprintln!("Failed to initialize logger: {}", err);
            Box::new(std::io::Error::other(err))
        })
}
