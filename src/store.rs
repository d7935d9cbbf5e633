use anyhow::Context;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{EndpointKey, FeedDocument, MasterDocument, RunState};

/// Missing or unreadable state means bootstrap; a state file we cannot
/// parse is treated the same way, with a warning, rather than aborting.
pub fn load_state(path: &Path) -> Option<RunState> {
  let raw = fs::read(path).ok()?;
  match serde_json::from_slice(&raw) {
    Ok(state) => Some(state),
    Err(e) => {
      tracing::warn!(path = %path.display(), error = %e, "state file unparsable; treating as first run");
      None
    }
  }
}

pub fn save_state(path: &Path, state: &RunState) -> anyhow::Result<()> {
  write_json_atomic(path, state)
}

/// Absent master file means an empty collection. A present but corrupt
/// master is fatal: overwriting it from empty would silently discard the
/// whole collection.
pub fn load_master(path: &Path) -> anyhow::Result<MasterDocument> {
  if !path.exists() {
    return Ok(MasterDocument::default());
  }

  let raw = fs::read(path).with_context(|| format!("read {}", path.display()))?;
  serde_json::from_slice(&raw).with_context(|| format!("parse {}", path.display()))
}

pub fn save_master(path: &Path, master: &MasterDocument) -> anyhow::Result<()> {
  write_json_atomic(path, master)
}

/// Derived dedup view, recomputed from the full document every run.
pub fn master_keys(master: &MasterDocument) -> HashSet<EndpointKey> {
  master
    .indicators
    .iter()
    .map(|indicator| indicator.endpoint_key())
    .collect()
}

/// Writes the feed document to its fixed location and duplicates the same
/// bytes into the archive copy.
pub fn save_feed(
  feed_path: &Path,
  archive_path: &Path,
  feed: &FeedDocument,
) -> anyhow::Result<()> {
  let bytes = serde_json::to_vec_pretty(feed).context("serialize feed document")?;
  atomic_write_file(feed_path, &bytes)?;
  atomic_write_file(archive_path, &bytes)?;
  Ok(())
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
  let bytes = serde_json::to_vec_pretty(value)
    .with_context(|| format!("serialize {}", path.display()))?;
  atomic_write_file(path, &bytes)
}

fn atomic_write_file(dst: &Path, bytes: &[u8]) -> anyhow::Result<()> {
  let dir = dst
    .parent()
    .ok_or_else(|| anyhow::anyhow!("destination has no parent directory"))?;
  fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;

  let tmp = tmp_path(dst);
  fs::write(&tmp, bytes).with_context(|| format!("write {}", tmp.display()))?;
  fs::rename(&tmp, dst)
    .with_context(|| format!("rename {} -> {}", tmp.display(), dst.display()))?;
  Ok(())
}

fn tmp_path(dst: &Path) -> PathBuf {
  let name = dst.file_name().and_then(|s| s.to_str()).unwrap_or("tmp");
  dst.with_file_name(format!(".{name}.tmp"))
}
