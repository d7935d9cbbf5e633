use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity key for an indicator. Two indicators with the same address and
/// port are the same endpoint regardless of any other field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointKey {
  pub address: String,
  pub port: u16,
}

impl EndpointKey {
  pub fn new(address: impl Into<String>, port: u16) -> Self {
    Self {
      address: address.into(),
      port,
    }
  }
}

impl fmt::Display for EndpointKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.address, self.port)
  }
}

/// One observed network endpoint matching a C2 fingerprinting query.
///
/// Every metadata field is optional: the normalizer never rejects a match,
/// however sparse the record from the search service turns out to be.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Indicator {
  pub ip: Option<String>,
  pub port: Option<u16>,
  pub product: Option<String>,
  #[serde(default)]
  pub tags: Vec<String>,
  pub org: Option<String>,
  pub asn: Option<String>,
  pub isp: Option<String>,
  pub country: Option<String>,
  pub city: Option<String>,
  pub last_seen: Option<String>,
  #[serde(default)]
  pub hostnames: Vec<String>,
  #[serde(default)]
  pub domains: Vec<String>,
  pub ssl_cn: Option<String>,
  pub ssl_issuer: Option<String>,
  pub ssl_fingerprint: Option<String>,
  pub jarm: Option<String>,
  pub http_title: Option<String>,
  pub http_server: Option<String>,
  pub os: Option<String>,
  pub query_matched: String,
  pub collected_at: DateTime<Utc>,
}

impl Indicator {
  /// Dedup key. A record missing its address or port still gets a stable
  /// key (empty address / port 0) so repeated sparse records collapse
  /// instead of accumulating.
  pub fn endpoint_key(&self) -> EndpointKey {
    EndpointKey::new(self.ip.clone().unwrap_or_default(), self.port.unwrap_or(0))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunType {
  Backfill,
  Incremental,
}

/// Persisted between runs; absence means the next run is a backfill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
  pub last_run: DateTime<Utc>,
  pub total_indicators_collected: u64,
}

/// Per-run delta feed, also duplicated byte-for-byte into the archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedDocument {
  pub generated_at: DateTime<Utc>,
  pub run_type: RunType,
  pub new_indicators_count: u64,
  pub indicators: Vec<Indicator>,
}

/// Cumulative deduplicated collection of every indicator ever observed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MasterDocument {
  #[serde(default)]
  pub indicators: Vec<Indicator>,
  #[serde(default)]
  pub last_updated: Option<DateTime<Utc>>,
  #[serde(default)]
  pub total_count: u64,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn endpoint_key_equality_is_composite() {
    let a = EndpointKey::new("10.0.0.1", 443);
    let b = EndpointKey::new("10.0.0.1", 443);
    let c = EndpointKey::new("10.0.0.1", 8443);
    assert_eq!(a, b);
    assert_ne!(a, c);
  }

  #[test]
  fn run_type_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&RunType::Backfill).unwrap(), "\"backfill\"");
    assert_eq!(serde_json::to_string(&RunType::Incremental).unwrap(), "\"incremental\"");
  }
}
