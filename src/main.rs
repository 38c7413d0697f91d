use anyhow::{Context, Result};
use clap::Parser;

use safety_link::cli::Cli;
use safety_link::config::Config;
use safety_link::driver::{connect_and_run, DriverSettings};
use safety_link::link::{list_ports, SerialConnector};
use safety_link::logging::init_tracing;
use safety_link::shutdown::ShutdownHandle;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.list_ports {
        return print_ports();
    }

    init_tracing();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    cli.apply_to(&mut config);
    let settings = DriverSettings::from_config(&config)?;

    let shutdown = ShutdownHandle::new();
    shutdown
        .install_signal_handlers()
        .context("Failed to install signal handlers")?;

    let connector = SerialConnector::new(config.link.read_timeout());
    let summary = connect_and_run(&connector, &settings, &shutdown)?;

    tracing::info!(
        "Sent {} frames over {} cycles, received {} replies",
        summary.frames_sent,
        summary.cycles,
        summary.replies
    );
    Ok(())
}

fn print_ports() -> Result<()> {
    let ports = list_ports()?;
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for port in ports {
        println!("{}\t{}", port.name, port.kind);
    }
    Ok(())
}
