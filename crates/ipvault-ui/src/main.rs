//! IP Vault desktop dashboard backed by the in-process devnet.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use ipvault_core::config::{IpvaultConfig, CONFIG_PATH_ENV};
use ipvault_core::logging;
use ipvault_devnet::Devnet;
use log::warn;
use serde_json::to_string_pretty;
use std::path::PathBuf;

mod app;

#[derive(Parser, Debug)]
#[command(
    name = "ipvault-ui",
    version,
    about = "Register and verify FHE-protected IP records."
)]
struct Cli {
    /// Path to the configuration file (falls back to $IPVAULT_CONFIG, then the per-user config).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the configuration JSON schema and exit.
    #[arg(long)]
    print_config_schema: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_config_schema {
        println!("{}", to_string_pretty(&IpvaultConfig::json_schema())?);
        return Ok(());
    }

    logging::init(&cli.log_level);

    let path = IpvaultConfig::resolve_path(cli.config.as_deref());
    let config = IpvaultConfig::load_or_bootstrap(&path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    if config.path != path {
        println!(
            "Using bootstrap configuration at {} (set {CONFIG_PATH_ENV} to replace).",
            config.path.display()
        );
    }
    for issue in config.validate() {
        warn!("configuration issue: {issue}");
    }

    let devnet = Devnet::from_config(&config).context("failed to start the devnet")?;
    let backends = devnet.backends();
    app::run(config, backends).map_err(|err| anyhow!("dashboard exited with an error: {err}"))
}
