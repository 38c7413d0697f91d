use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::sequencer::DEFAULT_STATES;

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub link: LinkConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub sequence: SequenceConfig,
}

/// Serial device settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Device path (e.g., "/dev/ttyUSB0", "COM3").
    #[serde(default = "default_port")]
    pub port: String,
    /// Baud rate (default: 115200).
    #[serde(default = "default_baud")]
    pub baud: u32,
    /// Upper bound for a single blocking read in milliseconds (default: 1000).
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

/// Pauses around each transmission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Settle time after opening, before any traffic (default: 2000).
    #[serde(default = "default_boot_delay_ms")]
    pub boot_delay_ms: u64,
    /// Wait between sending a label and draining replies (default: 100).
    #[serde(default = "default_ack_wait_ms")]
    pub ack_wait_ms: u64,
    /// Dwell on the current label before advancing (default: 1800).
    #[serde(default = "default_dwell_ms")]
    pub dwell_ms: u64,
}

/// The label cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceConfig {
    /// Labels in transmission order.
    #[serde(default = "default_states")]
    pub states: Vec<String>,
    /// Stop after this many cycles. Runs until interrupted when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cycles: Option<u64>,
}

impl LinkConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl TimingConfig {
    pub fn boot_delay(&self) -> Duration {
        Duration::from_millis(self.boot_delay_ms)
    }

    pub fn ack_wait(&self) -> Duration {
        Duration::from_millis(self.ack_wait_ms)
    }

    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }
}

fn default_port() -> String {
    "/dev/ttyUSB0".to_string()
}

fn default_baud() -> u32 {
    115200
}

fn default_read_timeout_ms() -> u64 {
    1000
}

fn default_boot_delay_ms() -> u64 {
    2000
}

fn default_ack_wait_ms() -> u64 {
    100
}

fn default_dwell_ms() -> u64 {
    1800
}

fn default_states() -> Vec<String> {
    DEFAULT_STATES.iter().map(|s| s.to_string()).collect()
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud: default_baud(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            boot_delay_ms: default_boot_delay_ms(),
            ack_wait_ms: default_ack_wait_ms(),
            dwell_ms: default_dwell_ms(),
        }
    }
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            states: default_states(),
            max_cycles: None,
        }
    }
}
