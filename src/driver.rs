//! The transmit/acknowledge cycle.
//!
//! ```text
//! open → await_ready → discard_buffered_input →
//!   [ send label → ack wait → drain replies → dwell → advance ] ...
//! ```
//!
//! Cancellation is checked before each send. Any transport error ends the
//! run; there is no retry or reconnect. The link is closed on every exit.

use std::time::Duration;

use crate::codec;
use crate::config::{Config, ConfigError, TimingConfig};
use crate::link::{Connector, Link, LinkError};
use crate::sequencer::Sequencer;
use crate::shutdown::ShutdownHandle;

/// Fixed pauses of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub boot_delay: Duration,
    pub ack_wait: Duration,
    pub dwell: Duration,
}

impl Timing {
    /// No pauses at all.
    pub const ZERO: Timing = Timing {
        boot_delay: Duration::ZERO,
        ack_wait: Duration::ZERO,
        dwell: Duration::ZERO,
    };
}

impl From<&TimingConfig> for Timing {
    fn from(config: &TimingConfig) -> Self {
        Self {
            boot_delay: config.boot_delay(),
            ack_wait: config.ack_wait(),
            dwell: config.dwell(),
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::from(&TimingConfig::default())
    }
}

/// What a run did before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Completed send/drain/dwell iterations.
    pub cycles: u64,
    pub frames_sent: u64,
    pub replies: u64,
}

/// Everything needed to start a run, resolved from validated config.
#[derive(Debug, Clone)]
pub struct DriverSettings {
    pub port: String,
    pub baud: u32,
    pub timing: Timing,
    pub sequencer: Sequencer,
    pub max_cycles: Option<u64>,
}

impl DriverSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let sequencer =
            Sequencer::new(config.state_labels()?).map_err(|e| ConfigError::ValidationError {
                message: e.to_string(),
            })?;

        Ok(Self {
            port: config.link.port.clone(),
            baud: config.link.baud,
            timing: Timing::from(&config.timing),
            sequencer,
            max_cycles: config.sequence.max_cycles,
        })
    }
}

/// Open the configured device and drive it until cancelled, the cycle
/// limit is reached, or the transport fails.
pub fn connect_and_run<C: Connector>(
    connector: &C,
    settings: &DriverSettings,
    shutdown: &ShutdownHandle,
) -> Result<RunSummary, LinkError> {
    let link = connector.open(&settings.port, settings.baud)?;
    CycleDriver::new(link, settings.sequencer.clone(), settings.timing)
        .max_cycles(settings.max_cycles)
        .run(shutdown)
}

/// Owns the link and the sequencer for the duration of a run.
pub struct CycleDriver<L: Link> {
    link: L,
    sequencer: Sequencer,
    timing: Timing,
    max_cycles: Option<u64>,
}

impl<L: Link> CycleDriver<L> {
    pub fn new(link: L, sequencer: Sequencer, timing: Timing) -> Self {
        Self {
            link,
            sequencer,
            timing,
            max_cycles: None,
        }
    }

    pub fn max_cycles(mut self, limit: Option<u64>) -> Self {
        self.max_cycles = limit;
        self
    }

    pub fn run(self, shutdown: &ShutdownHandle) -> Result<RunSummary, LinkError> {
        let Self {
            link,
            mut sequencer,
            timing,
            max_cycles,
        } = self;
        let mut link = scopeguard::guard(link, |mut link| link.close());
        let mut summary = RunSummary::default();

        tracing::debug!("Waiting {:?} for the controller to boot", timing.boot_delay);
        if !link.await_ready(timing.boot_delay, shutdown) {
            tracing::info!("Interrupted during boot settle");
            return Ok(summary);
        }
        link.discard_buffered_input()?;
        tracing::debug!("Discarded buffered input");

        loop {
            if shutdown.is_shutting_down() {
                tracing::info!("Stopping after {} cycles", summary.cycles);
                break;
            }
            if max_cycles.is_some_and(|limit| summary.cycles >= limit) {
                tracing::info!("Reached cycle limit of {}", summary.cycles);
                break;
            }

            let label = sequencer.current();
            link.write(&codec::encode(label))?;
            summary.frames_sent += 1;
            tracing::info!(
                cycle = summary.cycles,
                position = sequencer.position(),
                "sent {}",
                label
            );

            shutdown.sleep(timing.ack_wait);
            summary.replies += drain_replies(&mut *link, summary.cycles)?;
            shutdown.sleep(timing.dwell);

            sequencer.advance();
            summary.cycles += 1;
        }

        Ok(summary)
    }
}

/// Read and log every reply line queued right now.
///
/// Keeps reading until the link reports nothing pending; one read may not
/// exhaust a burst.
pub fn drain_replies<L: Link + ?Sized>(link: &mut L, cycle: u64) -> Result<u64, LinkError> {
    let mut count = 0;
    while link.bytes_available()? > 0 {
        let raw = link.read_line()?;
        let text = codec::decode(&raw);
        if codec::is_degraded(&text) {
            tracing::warn!(cycle, bytes = raw.len(), "reply contained invalid bytes");
        }
        tracing::info!(cycle, "received {}", text.trim());
        count += 1;
    }
    Ok(count)
}
