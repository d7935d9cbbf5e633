use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::types::Indicator;

/// Maps one raw search match into the flat indicator schema. Total over
/// arbitrary JSON: every access is get-or-default, so a match missing any
/// subtree (`ssl`, `location`, `http`, ...) still yields a record.
pub fn normalize(raw: &Value, query: &str, collected_at: DateTime<Utc>) -> Indicator {
  Indicator {
    ip: str_at(raw, &["ip_str"]),
    port: raw
      .get("port")
      .and_then(Value::as_u64)
      .and_then(|p| u16::try_from(p).ok()),
    product: str_at(raw, &["product"]),
    tags: str_list_at(raw, &["tags"]),
    org: str_at(raw, &["org"]),
    asn: str_at(raw, &["asn"]),
    isp: str_at(raw, &["isp"]),
    country: str_at(raw, &["location", "country_code"]),
    city: str_at(raw, &["location", "city"]),
    last_seen: str_at(raw, &["timestamp"]),
    hostnames: str_list_at(raw, &["hostnames"]),
    domains: str_list_at(raw, &["domains"]),
    ssl_cn: str_at(raw, &["ssl", "cert", "subject", "CN"]),
    ssl_issuer: str_at(raw, &["ssl", "cert", "issuer", "O"]),
    ssl_fingerprint: str_at(raw, &["ssl", "cert", "fingerprint", "sha256"]),
    jarm: str_at(raw, &["ssl", "jarm"]),
    http_title: str_at(raw, &["http", "title"]),
    http_server: str_at(raw, &["http", "server"]),
    os: str_at(raw, &["os"]),
    query_matched: query.to_string(),
    collected_at,
  }
}

fn value_at<'a>(raw: &'a Value, path: &[&str]) -> Option<&'a Value> {
  path.iter().try_fold(raw, |node, key| node.get(key))
}

fn str_at(raw: &Value, path: &[&str]) -> Option<String> {
  value_at(raw, path).and_then(Value::as_str).map(str::to_string)
}

fn str_list_at(raw: &Value, path: &[&str]) -> Vec<String> {
  value_at(raw, path)
    .and_then(Value::as_array)
    .map(|items| {
      items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
    })
    .unwrap_or_default()
}
