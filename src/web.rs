#![cfg(not(tarpaulin_include))]

use part_lookup::app;
use part_lookup::config::Config;

/// Main entry point for the web application
///
/// Reads the configuration from the command line, loads the comparison
/// workbook and runs the lookup server.
///
/// # Arguments
/// * `[DATA_PATH] [BIND_ADDR] [auto|button]` - all optional, positional
///
/// # Default Configuration
/// * Serves `賀展_比對結果.xlsx` on `127.0.0.1:3000`, searching on every change
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Success or error object
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_args(std::env::args().skip(1))?;
    log::info!(
        "Starting lookup server for {} ({:?} search)",
        config.data_path.display(),
        config.trigger
    );

    app::run(config).await
}
