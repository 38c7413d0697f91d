use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, SerialPortType, StopBits};

use crate::codec::LineBuffer;
use crate::link::{Connector, Link, LinkError};

const READ_CHUNK: usize = 256;

/// Opens 8N1 serial links with no flow control.
#[derive(Debug, Clone)]
pub struct SerialConnector {
    read_timeout: Duration,
}

impl SerialConnector {
    pub fn new(read_timeout: Duration) -> Self {
        Self { read_timeout }
    }
}

impl Connector for SerialConnector {
    type Link = SerialLink;

    fn open(&self, port: &str, baud: u32) -> Result<SerialLink, LinkError> {
        let handle = serialport::new(port, baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(self.read_timeout)
            .open()
            .map_err(|e| LinkError::Unavailable {
                port: port.to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!("Opened {} at {} baud", port, baud);
        Ok(SerialLink {
            name: port.to_string(),
            port: Some(handle),
            lines: LineBuffer::new(),
        })
    }
}

/// Serial device handle. Closed on drop.
pub struct SerialLink {
    name: String,
    port: Option<Box<dyn SerialPort>>,
    lines: LineBuffer,
}

impl SerialLink {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn port(&mut self, op: &'static str) -> Result<&mut Box<dyn SerialPort>, LinkError> {
        self.port.as_mut().ok_or_else(|| LinkError::closed(op))
    }
}

impl Link for SerialLink {
    fn discard_buffered_input(&mut self) -> Result<(), LinkError> {
        self.port("discard")?
            .clear(ClearBuffer::Input)
            .map_err(|e| LinkError::transport("discard", e.into()))?;
        self.lines.clear();
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        let port = self.port("write")?;
        port.write_all(bytes)
            .map_err(|e| LinkError::transport("write", e))?;
        port.flush().map_err(|e| LinkError::transport("write", e))
    }

    fn bytes_available(&mut self) -> Result<usize, LinkError> {
        let queued = self
            .port("poll")?
            .bytes_to_read()
            .map_err(|e| LinkError::transport("poll", e.into()))?;
        Ok(self.lines.len() + queued as usize)
    }

    fn read_line(&mut self) -> Result<Vec<u8>, LinkError> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(line) = self.lines.pop_line() {
                return Ok(line);
            }
            let port = self.port.as_mut().ok_or_else(|| LinkError::closed("read"))?;
            match port.read(&mut chunk) {
                // Device went quiet before a terminator.
                Ok(0) => return Ok(self.lines.take_partial()),
                Ok(count) => self.lines.push(&chunk[..count]),
                Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                    return Ok(self.lines.take_partial());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(LinkError::transport("read", e)),
            }
        }
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            self.lines.clear();
            tracing::info!("Closed {}", self.name);
        }
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        self.close();
    }
}

/// A serial device the OS reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortEntry {
    pub name: String,
    pub kind: String,
}

/// Enumerate serial devices for `--list-ports`.
pub fn list_ports() -> Result<Vec<PortEntry>, LinkError> {
    let ports = serialport::available_ports()
        .map_err(|e| LinkError::transport("enumerate", e.into()))?;
    Ok(ports
        .into_iter()
        .map(|info| PortEntry {
            name: info.port_name,
            kind: describe(&info.port_type),
        })
        .collect())
}

fn describe(port_type: &SerialPortType) -> String {
    match port_type {
        SerialPortType::UsbPort(usb) => {
            let mut kind = format!("USB {:04x}:{:04x}", usb.vid, usb.pid);
            if let Some(product) = &usb.product {
                kind.push(' ');
                kind.push_str(product);
            }
            kind
        }
        SerialPortType::PciPort => "PCI".to_string(),
        SerialPortType::BluetoothPort => "Bluetooth".to_string(),
        SerialPortType::Unknown => "unknown".to_string(),
    }
}
