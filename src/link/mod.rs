//! Point-to-point link to the safety controller.
//!
//! [`Connector`] acquires a link, [`Link`] is everything the cycle driver
//! does with it afterwards. The serial implementation lives in [`serial`];
//! tests substitute their own.

mod error;
mod serial;

pub use error::LinkError;
pub use serial::{list_ports, PortEntry, SerialConnector, SerialLink};

use std::time::Duration;

use crate::shutdown::ShutdownHandle;

/// Opens links. Separate from [`Link`] so the open step can be observed
/// and faked like every other step.
pub trait Connector {
    type Link: Link;

    fn open(&self, port: &str, baud: u32) -> Result<Self::Link, LinkError>;
}

/// An exclusively owned, open connection to one device.
pub trait Link {
    /// Wait out the peripheral's boot. A fixed delay, not a handshake.
    ///
    /// Returns `false` if shutdown was signaled while waiting.
    fn await_ready(&mut self, settle: Duration, shutdown: &ShutdownHandle) -> bool {
        shutdown.sleep(settle)
    }

    /// Drop anything received before the driver took control.
    fn discard_buffered_input(&mut self) -> Result<(), LinkError>;

    /// Send bytes in order, blocking until the device buffer accepts them.
    fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError>;

    /// Bytes waiting to be read, whether still queued in the device or
    /// already buffered by the link.
    fn bytes_available(&mut self) -> Result<usize, LinkError>;

    /// Read up to the next `\n` (excluded), or whatever arrived before the
    /// device went quiet.
    ///
    /// Returns at once when a complete line is pending. A pending tail with
    /// no terminator is only returned after the link's read timeout
    /// expires, so a drain ending on such a tail blocks for that long.
    fn read_line(&mut self) -> Result<Vec<u8>, LinkError>;

    /// Release the device. Idempotent.
    fn close(&mut self);
}
