use std::io;

use thiserror::Error;

/// Failures of the serial link. Both kinds are fatal to the driver.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The device could not be acquired: missing path, permissions, or
    /// already held exclusively by another process.
    #[error("Failed to open serial port '{port}': {reason}. Check the device path and that no other program holds it.")]
    Unavailable { port: String, reason: String },

    /// I/O failed after the link was open.
    #[error("Serial transport failed during {op}: {source}")]
    TransportFailure {
        op: &'static str,
        #[source]
        source: io::Error,
    },
}

impl LinkError {
    pub fn transport(op: &'static str, source: io::Error) -> Self {
        LinkError::TransportFailure { op, source }
    }

    pub fn closed(op: &'static str) -> Self {
        LinkError::TransportFailure {
            op,
            source: io::Error::new(io::ErrorKind::NotConnected, "link is closed"),
        }
    }
}
