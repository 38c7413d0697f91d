use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

/// Cycle operating-mode labels to a safety controller over a serial link.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "safety-link", version, about)]
pub struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Serial device path
    #[arg(long, value_name = "DEVICE")]
    pub port: Option<String>,

    /// Baud rate
    #[arg(long)]
    pub baud: Option<u32>,

    /// Settle time after opening the port, in milliseconds
    #[arg(long, value_name = "MS")]
    pub boot_delay_ms: Option<u64>,

    /// Wait between sending a label and reading replies, in milliseconds
    #[arg(long, value_name = "MS")]
    pub ack_wait_ms: Option<u64>,

    /// Time spent on each label before advancing, in milliseconds
    #[arg(long, value_name = "MS")]
    pub dwell_ms: Option<u64>,

    /// Upper bound for one blocking read, in milliseconds
    #[arg(long, value_name = "MS")]
    pub read_timeout_ms: Option<u64>,

    /// Comma-separated label sequence, e.g. OFF,READY,DRIVING
    #[arg(long, value_delimiter = ',', value_name = "LABELS")]
    pub states: Option<Vec<String>>,

    /// Stop after this many cycles instead of running until interrupted
    #[arg(long, value_name = "N")]
    pub cycles: Option<u64>,

    /// Print available serial ports and exit
    #[arg(long)]
    pub list_ports: bool,
}

impl Cli {
    /// Overlay command-line values onto a loaded config.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(port) = &self.port {
            config.link.port = port.clone();
        }
        if let Some(baud) = self.baud {
            config.link.baud = baud;
        }
        if let Some(ms) = self.read_timeout_ms {
            config.link.read_timeout_ms = ms;
        }
        if let Some(ms) = self.boot_delay_ms {
            config.timing.boot_delay_ms = ms;
        }
        if let Some(ms) = self.ack_wait_ms {
            config.timing.ack_wait_ms = ms;
        }
        if let Some(ms) = self.dwell_ms {
            config.timing.dwell_ms = ms;
        }
        if let Some(states) = &self.states {
            config.sequence.states = states.iter().map(|s| s.trim().to_string()).collect();
        }
        if let Some(cycles) = self.cycles {
            config.sequence.max_cycles = Some(cycles);
        }
    }
}
