use chrono::{DateTime, NaiveDate, Utc};
use std::fs;
use std::path::PathBuf;

use crate::config::Config;
use crate::dedupe::dedupe;
use crate::normalize::normalize;
use crate::paths;
use crate::shodan::SearchClient;
use crate::store;
use crate::types::{FeedDocument, Indicator, RunState, RunType};

#[derive(Debug)]
pub struct RunSummary {
  pub run_type: RunType,
  pub new_indicators: u64,
  pub master_total: u64,
  pub archive_path: PathBuf,
  /// Up to five `address:port | product | country` lines for the console.
  pub sample: Vec<String>,
}

pub struct Collector<C> {
  cfg: Config,
  client: C,
}

impl<C: SearchClient> Collector<C> {
  pub fn new(cfg: Config, client: C) -> Self {
    Self { cfg, client }
  }

  /// One full pass: load state and master, fetch per catalog query,
  /// normalize, dedupe, then persist master, feed, archive, and state in
  /// that order. Exactly one pass per invocation; continuation comes from
  /// the external scheduler.
  pub fn run_once(&self, now: DateTime<Utc>) -> anyhow::Result<RunSummary> {
    let data_dir = &self.cfg.data_dir;
    fs::create_dir_all(paths::archive_dir(data_dir))?;

    let state = store::load_state(&paths::state_path(data_dir));
    let mut master = store::load_master(&paths::master_path(data_dir))?;
    let mut known = store::master_keys(&master);

    // Backfill runs fetch with no date filter at all; the alternative
    // fixed-lookback variant was rejected, see DESIGN.md.
    let (run_type, after, cap) = match &state {
      None => (RunType::Backfill, None, self.cfg.shodan.backfill_cap),
      Some(prior) => (
        RunType::Incremental,
        Some(prior.last_run.date_naive()),
        self.cfg.shodan.incremental_cap,
      ),
    };

    tracing::info!(
      run_type = ?run_type,
      existing_indicators = known.len(),
      last_run = ?state.as_ref().map(|s| s.last_run),
      "starting collection run"
    );

    let candidates = self.fetch_all(after, cap, now);
    let fresh = dedupe(candidates, &mut known);
    tracing::info!(new_unique = fresh.len(), "deduplication complete");

    master.indicators.extend(fresh.iter().cloned());
    master.last_updated = Some(now);
    master.total_count = master.indicators.len() as u64;
    store::save_master(&paths::master_path(data_dir), &master)?;

    let sample = fresh
      .iter()
      .take(5)
      .map(|i| {
        format!(
          "{} | {} | {}",
          i.endpoint_key(),
          i.product.as_deref().unwrap_or("-"),
          i.country.as_deref().unwrap_or("-")
        )
      })
      .collect();

    let feed = FeedDocument {
      generated_at: now,
      run_type,
      new_indicators_count: fresh.len() as u64,
      indicators: fresh,
    };
    let archive_path = paths::archive_path(data_dir, now);
    store::save_feed(&paths::feed_path(data_dir), &archive_path, &feed)?;

    store::save_state(
      &paths::state_path(data_dir),
      &RunState {
        last_run: now,
        total_indicators_collected: master.total_count,
      },
    )?;

    tracing::info!(
      new = feed.new_indicators_count,
      master_total = master.total_count,
      archive = %archive_path.display(),
      "collection run finished"
    );

    Ok(RunSummary {
      run_type,
      new_indicators: feed.new_indicators_count,
      master_total: master.total_count,
      archive_path,
      sample,
    })
  }

  /// Issues catalog queries sequentially. A failing query is logged and
  /// skipped; later queries still run. Partial success is acceptable.
  fn fetch_all(
    &self,
    after: Option<NaiveDate>,
    cap: usize,
    now: DateTime<Utc>,
  ) -> Vec<Indicator> {
    let mut out = Vec::new();

    for query in &self.cfg.queries {
      tracing::info!(%query, "querying");
      match self.client.search(query, after, cap) {
        Ok(matches) => {
          tracing::info!(%query, results = matches.len(), "query complete");
          out.extend(matches.iter().map(|m| normalize(m, query, now)));
        }
        Err(e) => {
          tracing::warn!(%query, error = %e, "query failed; skipping");
        }
      }
    }

    tracing::info!(raw_results = out.len(), "fetch complete");
    out
  }
}
