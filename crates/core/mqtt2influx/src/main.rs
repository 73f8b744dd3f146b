mod config;
mod converter;
mod logging;
mod monitor;

use crate::config::BridgeConfig;
use crate::monitor::BridgeMonitor;
use clap::Parser;
use tracing::info;
use tracing::info_span;
use tracing::Instrument;

const APP_NAME: &str = "mqtt2influx";

#[derive(Debug, Parser)]
#[clap(
    name = clap::crate_name!(),
    version = clap::crate_version!(),
    about = clap::crate_description!()
)]
struct BridgeOpt {
    /// Report debug level events, overriding RUST_LOG
    #[clap(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opt = BridgeOpt::parse();
    logging::init(opt.debug);

    info!("{} starting", APP_NAME);

    // A missing setting is fatal: the process exits before connecting.
    let config = BridgeConfig::from_env()?;

    let monitor = BridgeMonitor::new(config);
    monitor.run().instrument(info_span!("mqtt2influx")).await?;

    Ok(())
}
