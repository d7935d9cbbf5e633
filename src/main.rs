use anyhow::Context;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
  let args: Vec<String> = std::env::args().collect();

  if args.iter().any(|a| a == "--version") {
    println!("{}", env!("CARGO_PKG_VERSION"));
    return Ok(());
  }

  // Fail fast before any file is touched.
  let api_key = std::env::var("SHODAN_API_KEY")
    .context("SHODAN_API_KEY must be set in the environment")?;

  let config_path = config_path_from_args(&args);
  let cfg = c2feed::config::load_or_default(&config_path)?;

  c2feed::run(cfg, api_key)
}

fn config_path_from_args(args: &[String]) -> PathBuf {
  args
    .iter()
    .position(|a| a == "--config")
    .and_then(|i| args.get(i + 1))
    .map(PathBuf::from)
    .unwrap_or_else(|| PathBuf::from("config.toml"))
}
