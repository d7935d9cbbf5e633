pub mod config;
pub mod dedupe;
pub mod logging;
pub mod normalize;
pub mod paths;
pub mod run;
pub mod shodan;
pub mod store;
pub mod types;

use chrono::Utc;

use crate::run::RunSummary;
use crate::types::RunType;

/// Performs one collection pass and prints the operator summary.
pub fn run(cfg: config::Config, api_key: String) -> anyhow::Result<()> {
  logging::init(
    &paths::logs_dir(&cfg.data_dir),
    &cfg.logging.level,
    cfg.logging.retention_days,
  )?;

  let client = shodan::ShodanClient::new(api_key, &cfg.shodan)?;
  let collector = run::Collector::new(cfg, client);
  let summary = collector.run_once(Utc::now())?;

  print_summary(&summary);
  Ok(())
}

fn print_summary(summary: &RunSummary) {
  let run_type = match summary.run_type {
    RunType::Backfill => "Backfill (first run)",
    RunType::Incremental => "Incremental",
  };

  println!("{}", "=".repeat(50));
  println!("SUMMARY");
  println!("{}", "=".repeat(50));
  println!("Run type: {run_type}");
  println!("New indicators this run: {}", summary.new_indicators);
  println!("Total indicators in master: {}", summary.master_total);
  println!("Archived to: {}", summary.archive_path.display());

  if !summary.sample.is_empty() {
    println!("\nSample of new indicators:");
    for line in &summary.sample {
      println!("  - {line}");
    }
  }
}
