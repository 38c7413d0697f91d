use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming an optional log file.
pub const LOG_FILE_ENV: &str = "SAFETY_LINK_LOG";

/// Initialize tracing: console output always, plus a file if
/// `SAFETY_LINK_LOG` is set.
///
/// The filter comes from `RUST_LOG` and defaults to `info`, which is the
/// level of the per-frame `sent`/`received` lines.
///
/// Log files get unique names so parallel runs against different devices
/// don't clobber each other: `{path}.{timestamp}.{pid}`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    let file_layer = log_file_path().and_then(|path| match std::fs::File::create(&path) {
        Ok(file) => Some(
            fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_level(true),
        ),
        Err(err) => {
            eprintln!("Warning: Failed to create log file {}: {}", path, err);
            None
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();
}

fn log_file_path() -> Option<String> {
    let base = std::env::var(LOG_FILE_ENV).ok()?;
    let pid = std::process::id();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    Some(format!("{}.{}.{}", base, timestamp, pid))
}
