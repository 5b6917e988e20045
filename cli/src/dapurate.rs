use anyhow::Result;
use std::path::PathBuf;

mod dapurate_logic;
use dapurate_logic::{commands, config, logger};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load_config();

    let log_dir = config
        .log_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("./logs"));
    let log_level = config.log_level.clone().unwrap_or_else(|| "info".to_string());
    logger::setup_logging(&log_dir, &log_level)?;

    commands::run(config).await
}
