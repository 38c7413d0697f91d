use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use signal_hook::consts::signal::{SIGINT, SIGTERM};

/// Longest uninterrupted sleep inside [`ShutdownHandle::sleep`].
pub const POLL_SLICE: Duration = Duration::from_millis(50);

/// Cooperative cancellation flag shared between signal handlers and the
/// cycle driver.
#[derive(Clone, Default)]
pub struct ShutdownHandle {
    shutdown: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag on SIGINT and SIGTERM instead of killing the process,
    /// so the link is released by the driver on the way out.
    pub fn install_signal_handlers(&self) -> io::Result<()> {
        for signal in [SIGINT, SIGTERM] {
            signal_hook::flag::register(signal, Arc::clone(&self.shutdown))?;
        }
        Ok(())
    }

    pub fn signal(&self) {
        if !self.shutdown.swap(true, Ordering::SeqCst) {
            tracing::info!("Shutdown requested");
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Sleep for `duration`, waking early once shutdown is signaled.
    ///
    /// Returns `true` if the full duration elapsed.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_shutting_down() {
                return false;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return true;
            }
            thread::sleep(remaining.min(POLL_SLICE));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_running() {
        let handle = ShutdownHandle::new();
        assert!(!handle.is_shutting_down());
    }

    #[test]
    fn clones_share_state() {
        let handle = ShutdownHandle::new();
        let other = handle.clone();
        other.signal();
        assert!(handle.is_shutting_down());
    }

    #[test]
    fn sleep_completes_when_not_signaled() {
        let handle = ShutdownHandle::new();
        let start = Instant::now();
        assert!(handle.sleep(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn sleep_returns_early_after_signal() {
        let handle = ShutdownHandle::new();
        let signaller = handle.clone();
        let worker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            signaller.signal();
        });

        let start = Instant::now();
        assert!(!handle.sleep(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_secs(2));
        worker.join().unwrap();
    }

    #[test]
    fn zero_sleep_is_immediate() {
        let handle = ShutdownHandle::new();
        assert!(handle.sleep(Duration::ZERO));
    }
}
