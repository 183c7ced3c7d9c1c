use std::time::Instant;

use clap::Parser;
use log::info;

use fleetpush::{DeviceTask, Inventory, Orchestrator, OutputWriter};

mod cli;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let started = Instant::now();
    let cli = Cli::parse();

    let inventory = Inventory::from_path(&cli.inventory)?;
    let config = cli.run_config();
    info!(
        "Deploying to {} devices from {}",
        inventory.len(),
        cli.inventory.display()
    );

    let task = DeviceTask::from_config(cli.connector(), &config);
    let orchestrator = Orchestrator::new(task).with_max_concurrency(config.max_concurrency);
    let writer = OutputWriter::new(&config.log_dir, config.utc_offset);

    orchestrator.deploy(&inventory.devices, &writer).await?;

    println!("Please check device logs for any errors");
    println!("It took {} seconds to run", started.elapsed().as_secs_f64());

    Ok(())
}
