use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use std::time::{Duration, SystemTime};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const LOG_FILE_PREFIX: &str = "c2feed.log";

/// Daily-rolling file log under the data dir plus a stderr layer for the
/// operator running the collector by hand or from a scheduler.
pub fn init(log_dir: &Path, level: &str, retention_days: u64) -> anyhow::Result<()> {
  fs::create_dir_all(log_dir)?;
  cleanup_old_logs(log_dir, retention_days);

  let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
  let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
  let _ = FILE_GUARD.set(guard);

  let filter = tracing_subscriber::EnvFilter::try_new(level)
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

  let file_layer = tracing_subscriber::fmt::layer()
    .with_ansi(false)
    .with_writer(file_writer)
    .with_target(true);

  let stderr_layer = tracing_subscriber::fmt::layer()
    .with_ansi(false)
    .with_writer(std::io::stderr)
    .with_target(true);

  tracing_subscriber::registry()
    .with(filter)
    .with(file_layer)
    .with(stderr_layer)
    .init();

  Ok(())
}

fn cleanup_old_logs(log_dir: &Path, retention_days: u64) {
  if retention_days == 0 {
    return;
  }

  let cutoff = SystemTime::now()
    .checked_sub(Duration::from_secs(retention_days.saturating_mul(24 * 60 * 60)))
    .unwrap_or(SystemTime::UNIX_EPOCH);

  let Ok(entries) = fs::read_dir(log_dir) else {
    return;
  };

  for entry in entries.flatten() {
    let path = entry.path();
    let is_log = path
      .file_name()
      .and_then(|n| n.to_str())
      .map(|n| n == LOG_FILE_PREFIX || n.starts_with(&format!("{LOG_FILE_PREFIX}.")))
      .unwrap_or(false);
    if !is_log {
      continue;
    }

    let modified = entry.metadata().and_then(|m| m.modified());
    if let Ok(modified) = modified {
      if modified < cutoff {
        let _ = fs::remove_file(&path);
      }
    }
  }
}
