use std::collections::HashSet;

use crate::types::{EndpointKey, Indicator};

/// Filters candidates down to endpoints not yet in `known`, preserving
/// input order. Inserts into `known` as it goes, so two catalog queries
/// matching the same endpoint within one run collapse to the first
/// occurrence.
pub fn dedupe(candidates: Vec<Indicator>, known: &mut HashSet<EndpointKey>) -> Vec<Indicator> {
  let mut fresh = Vec::new();
  for indicator in candidates {
    if known.insert(indicator.endpoint_key()) {
      fresh.push(indicator);
    }
  }
  fresh
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::normalize::normalize;
  use chrono::{TimeZone, Utc};
  use serde_json::json;

  fn indicator(ip: &str, port: u16, query: &str) -> Indicator {
    let at = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
    normalize(&json!({"ip_str": ip, "port": port}), query, at)
  }

  #[test]
  fn filters_out_known_endpoints() {
    let mut known = HashSet::from([EndpointKey::new("1.2.3.4", 443)]);
    let fresh = dedupe(
      vec![indicator("1.2.3.4", 443, "a"), indicator("9.9.9.9", 22, "a")],
      &mut known,
    );

    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].ip.as_deref(), Some("9.9.9.9"));
    assert_eq!(known.len(), 2);
  }

  #[test]
  fn intra_run_duplicates_keep_first_query_occurrence() {
    let mut known = HashSet::new();
    let fresh = dedupe(
      vec![
        indicator("1.2.3.4", 443, "query-one"),
        indicator("5.6.7.8", 80, "query-one"),
        indicator("1.2.3.4", 443, "query-two"),
      ],
      &mut known,
    );

    assert_eq!(fresh.len(), 2);
    assert_eq!(fresh[0].query_matched, "query-one");
    assert_eq!(fresh[1].ip.as_deref(), Some("5.6.7.8"));
  }

  #[test]
  fn order_is_preserved() {
    let mut known = HashSet::new();
    let fresh = dedupe(
      vec![
        indicator("3.3.3.3", 1, "q"),
        indicator("1.1.1.1", 1, "q"),
        indicator("2.2.2.2", 1, "q"),
      ],
      &mut known,
    );

    let ips: Vec<_> = fresh.iter().filter_map(|i| i.ip.as_deref()).collect();
    assert_eq!(ips, vec!["3.3.3.3", "1.1.1.1", "2.2.2.2"]);
  }

  #[test]
  fn second_pass_over_same_input_is_empty() {
    let mut known = HashSet::new();
    let batch = vec![indicator("1.2.3.4", 443, "q"), indicator("5.6.7.8", 80, "q")];

    let first = dedupe(batch.clone(), &mut known);
    assert_eq!(first.len(), 2);

    let second = dedupe(batch, &mut known);
    assert!(second.is_empty());
  }

  #[test]
  fn same_address_different_port_is_distinct() {
    let mut known = HashSet::new();
    let fresh = dedupe(
      vec![indicator("1.2.3.4", 443, "q"), indicator("1.2.3.4", 8443, "q")],
      &mut known,
    );
    assert_eq!(fresh.len(), 2);
  }
}
