use anyhow::Context;
use chrono::NaiveDate;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::config::ShodanConfig;

/// Fixed page size of the Shodan search endpoint.
pub const PAGE_SIZE: usize = 100;

/// Seam between the run coordinator and the external search service.
/// Matches are opaque JSON; the normalizer owns all field access.
pub trait SearchClient {
  fn search(&self, query: &str, after: Option<NaiveDate>, cap: usize)
    -> anyhow::Result<Vec<Value>>;
}

pub struct ShodanClient {
  http: Client,
  base: Url,
  api_key: String,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
  #[serde(default)]
  matches: Vec<Value>,
}

impl ShodanClient {
  pub fn new(api_key: String, cfg: &ShodanConfig) -> anyhow::Result<Self> {
    if api_key.trim().is_empty() {
      anyhow::bail!("Shodan API key is empty");
    }

    let http = Client::builder()
      .timeout(Duration::from_secs(cfg.timeout_seconds))
      .build()
      .context("build HTTP client")?;

    let base = Url::parse(&cfg.api_url).with_context(|| format!("invalid api_url: {}", cfg.api_url))?;

    Ok(Self {
      http,
      base,
      api_key,
    })
  }

  fn fetch_page(&self, query: &str, page: usize) -> anyhow::Result<SearchPage> {
    let mut url = self.base.join("/shodan/host/search").context("build search URL")?;
    url
      .query_pairs_mut()
      .append_pair("key", &self.api_key)
      .append_pair("query", query)
      .append_pair("page", &page.to_string());

    // Error contexts name the endpoint, never the full URL: the key rides
    // in the query string.
    let response = self
      .http
      .get(url)
      .header(USER_AGENT, format!("c2feed/{}", env!("CARGO_PKG_VERSION")))
      .send()
      .with_context(|| format!("GET /shodan/host/search page {page}"))?;

    let status = response.status();
    if !status.is_success() {
      anyhow::bail!("search returned HTTP {} on page {page}", status.as_u16());
    }

    let body = response.bytes().context("read search response body")?;
    serde_json::from_slice(&body).context("parse search response JSON")
  }
}

/// Appends the service's own date-filter conjunction to a query. Shodan's
/// `after` filter takes day/month/year and is a calendar-day lower bound.
pub fn with_after_filter(query: &str, after: NaiveDate) -> String {
  format!("{query} after:{}", after.format("%d/%m/%Y"))
}

impl SearchClient for ShodanClient {
  fn search(
    &self,
    query: &str,
    after: Option<NaiveDate>,
    cap: usize,
  ) -> anyhow::Result<Vec<Value>> {
    let effective = match after {
      Some(day) => with_after_filter(query, day),
      None => query.to_string(),
    };

    let mut out = Vec::new();
    let mut page = 1;
    loop {
      let batch = self.fetch_page(&effective, page)?;
      let fetched = batch.matches.len();
      out.extend(batch.matches);

      if out.len() >= cap {
        out.truncate(cap);
        break;
      }
      if fetched < PAGE_SIZE {
        break;
      }
      page += 1;
    }

    Ok(out)
  }
}
