//! Shared test utilities and a scripted fake link.

#![allow(dead_code, unused_imports)]

use parking_lot::Mutex;
use safety_link::link::{Connector, Link, LinkError};
use safety_link::shutdown::ShutdownHandle;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// One observed interaction with the fake link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open { port: String, baud: u32 },
    AwaitReady(Duration),
    Discard,
    Write(Vec<u8>),
    BytesAvailable(usize),
    ReadLine(Vec<u8>),
    Close,
}

/// Ordered record of every call, shared between the test and the fake.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Call>>>);

impl Journal {
    pub fn push(&self, call: Call) {
        self.0.lock().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().clone()
    }

    /// Frames passed to `write`, including a failed attempt.
    pub fn writes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Write(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn closes(&self) -> usize {
        self.count(|c| matches!(c, Call::Close))
    }

    pub fn last(&self) -> Option<Call> {
        self.calls().last().cloned()
    }
}

#[derive(Clone, Default)]
struct Script {
    boot_chatter: Vec<Vec<u8>>,
    replies: HashMap<usize, Vec<Vec<u8>>>,
    fail_on_write: Option<usize>,
    fail_open: bool,
    signal_after_writes: Option<(usize, ShutdownHandle)>,
}

/// Hands out [`FakeLink`]s that follow a script and log into a journal.
#[derive(Clone, Default)]
pub struct FakeConnector {
    journal: Journal,
    script: Script,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }

    /// Lines already queued when the link opens.
    pub fn boot_chatter(mut self, lines: &[&str]) -> Self {
        self.script.boot_chatter = lines.iter().map(|l| l.as_bytes().to_vec()).collect();
        self
    }

    /// Reply lines queued after the write with this zero-based index.
    pub fn reply_to_write(mut self, index: usize, lines: &[&[u8]]) -> Self {
        self.script
            .replies
            .insert(index, lines.iter().map(|l| l.to_vec()).collect());
        self
    }

    /// Fail the nth write (1-based) with a broken pipe.
    pub fn fail_on_write(mut self, nth: usize) -> Self {
        self.script.fail_on_write = Some(nth);
        self
    }

    pub fn fail_open(mut self) -> Self {
        self.script.fail_open = true;
        self
    }

    /// Signal shutdown once `writes` frames have been accepted.
    pub fn signal_after_writes(mut self, writes: usize, shutdown: &ShutdownHandle) -> Self {
        self.script.signal_after_writes = Some((writes, shutdown.clone()));
        self
    }
}

impl Connector for FakeConnector {
    type Link = FakeLink;

    fn open(&self, port: &str, baud: u32) -> Result<FakeLink, LinkError> {
        if self.script.fail_open {
            return Err(LinkError::Unavailable {
                port: port.to_string(),
                reason: "Device or resource busy".to_string(),
            });
        }
        self.journal.push(Call::Open {
            port: port.to_string(),
            baud,
        });
        let mut link = FakeLink::new(self.journal.clone());
        link.inbox = self.script.boot_chatter.iter().cloned().collect();
        link.script = self.script.clone();
        Ok(link)
    }
}

/// In-memory link. Each queued reply is one line without its terminator.
pub struct FakeLink {
    journal: Journal,
    script: Script,
    inbox: VecDeque<Vec<u8>>,
    writes: usize,
    open: bool,
}

impl FakeLink {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            script: Script::default(),
            inbox: VecDeque::new(),
            writes: 0,
            open: true,
        }
    }

    pub fn queue(&mut self, line: &[u8]) {
        self.inbox.push_back(line.to_vec());
    }

    fn pending(&self) -> usize {
        self.inbox.iter().map(|l| l.len() + 1).sum()
    }
}

impl Link for FakeLink {
    fn await_ready(&mut self, settle: Duration, shutdown: &ShutdownHandle) -> bool {
        self.journal.push(Call::AwaitReady(settle));
        !shutdown.is_shutting_down()
    }

    fn discard_buffered_input(&mut self) -> Result<(), LinkError> {
        self.journal.push(Call::Discard);
        self.inbox.clear();
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        self.journal.push(Call::Write(bytes.to_vec()));
        if !self.open {
            return Err(LinkError::closed("write"));
        }
        self.writes += 1;
        if self.script.fail_on_write == Some(self.writes) {
            return Err(LinkError::transport(
                "write",
                io::Error::new(io::ErrorKind::BrokenPipe, "device disconnected"),
            ));
        }
        if let Some(lines) = self.script.replies.get(&(self.writes - 1)) {
            self.inbox.extend(lines.iter().cloned());
        }
        if let Some((after, shutdown)) = &self.script.signal_after_writes {
            if self.writes >= *after {
                shutdown.signal();
            }
        }
        Ok(())
    }

    fn bytes_available(&mut self) -> Result<usize, LinkError> {
        let pending = self.pending();
        self.journal.push(Call::BytesAvailable(pending));
        Ok(pending)
    }

    fn read_line(&mut self) -> Result<Vec<u8>, LinkError> {
        let line = self.inbox.pop_front().unwrap_or_default();
        self.journal.push(Call::ReadLine(line.clone()));
        Ok(line)
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.journal.push(Call::Close);
        }
    }
}

/// Write `content` to a config file in a fresh temp dir.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}
