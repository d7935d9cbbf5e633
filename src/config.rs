use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
  #[serde(default = "default_data_dir")]
  pub data_dir: PathBuf,

  #[serde(default)]
  pub logging: LoggingConfig,

  #[serde(default)]
  pub shodan: ShodanConfig,

  #[serde(default = "default_queries")]
  pub queries: Vec<String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      data_dir: default_data_dir(),
      logging: LoggingConfig::default(),
      shodan: ShodanConfig::default(),
      queries: default_queries(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
  #[serde(default = "default_log_level")]
  pub level: String,

  #[serde(default = "default_retention_days")]
  pub retention_days: u64,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
      retention_days: default_retention_days(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShodanConfig {
  #[serde(default = "default_api_url")]
  pub api_url: String,

  #[serde(default = "default_timeout_seconds")]
  pub timeout_seconds: u64,

  /// Per-query result cap when no date boundary is set (backfill runs).
  #[serde(default = "default_backfill_cap")]
  pub backfill_cap: usize,

  /// Per-query result cap for incremental runs, where the window since the
  /// last run is assumed to be small.
  #[serde(default = "default_incremental_cap")]
  pub incremental_cap: usize,
}

impl Default for ShodanConfig {
  fn default() -> Self {
    Self {
      api_url: default_api_url(),
      timeout_seconds: default_timeout_seconds(),
      backfill_cap: default_backfill_cap(),
      incremental_cap: default_incremental_cap(),
    }
  }
}

fn default_data_dir() -> PathBuf {
  PathBuf::from("data")
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_retention_days() -> u64 {
  14
}

fn default_api_url() -> String {
  "https://api.shodan.io".to_string()
}

fn default_timeout_seconds() -> u64 {
  30
}

fn default_backfill_cap() -> usize {
  500
}

fn default_incremental_cap() -> usize {
  200
}

/// Known C2 framework fingerprints: product banners, TLS JARM hashes, and
/// HTTP body/favicon hashes. Order is execution order; dedup is global
/// across queries, so reordering never changes the collected set.
fn default_queries() -> Vec<String> {
  [
    "product:\"Cobalt Strike\"",
    "product:\"Metasploit\"",
    "product:\"Sliver\"",
    "product:\"Brute Ratel\"",
    "product:\"Havoc\"",
    "product:\"Mythic\"",
    "http.html_hash:-1957161625",
    "ssl.jarm:07d14d16d21d21d00042d41d00041de5fb3038104f457d92ba02e9311512c2",
    "ssl.jarm:2ad2ad16d2ad2ad00042d42d00042ddb04deffa1705e2edc44cae1ed24a4da",
    "http.favicon.hash:627523027",
  ]
  .iter()
  .map(|q| q.to_string())
  .collect()
}

/// Missing config file means defaults; a present but unparsable file is a
/// hard error rather than a silent fallback.
pub fn load_or_default(path: &Path) -> anyhow::Result<Config> {
  if !path.exists() {
    return Ok(Config::default());
  }

  let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
  toml::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_catalog_is_ordered_and_complete() {
    let cfg = Config::default();
    assert_eq!(cfg.queries.len(), 10);
    assert_eq!(cfg.queries[0], "product:\"Cobalt Strike\"");
    assert!(cfg.queries.iter().any(|q| q.starts_with("ssl.jarm:")));
  }

  #[test]
  fn partial_toml_falls_back_to_field_defaults() {
    let cfg: Config = toml::from_str(
      r#"
data_dir = "/tmp/c2feed-test"

[shodan]
timeout_seconds = 5
"#,
    )
    .unwrap();

    assert_eq!(cfg.data_dir, PathBuf::from("/tmp/c2feed-test"));
    assert_eq!(cfg.shodan.timeout_seconds, 5);
    assert_eq!(cfg.shodan.backfill_cap, 500);
    assert_eq!(cfg.shodan.incremental_cap, 200);
    assert_eq!(cfg.logging.level, "info");
    assert_eq!(cfg.queries.len(), 10);
  }

  #[test]
  fn queries_can_be_overridden() {
    let cfg: Config = toml::from_str(r#"queries = ["product:\"Test\""]"#).unwrap();
    assert_eq!(cfg.queries, vec!["product:\"Test\"".to_string()]);
  }

  #[test]
  fn missing_file_yields_defaults() {
    let cfg = load_or_default(Path::new("/nonexistent/c2feed/config.toml")).unwrap();
    assert_eq!(cfg.data_dir, PathBuf::from("data"));
  }
}
