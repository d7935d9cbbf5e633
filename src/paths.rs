use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

pub fn state_path(data_dir: &Path) -> PathBuf {
  data_dir.join("state.json")
}

pub fn feed_path(data_dir: &Path) -> PathBuf {
  data_dir.join("c2_feed.json")
}

pub fn master_path(data_dir: &Path) -> PathBuf {
  data_dir.join("c2_master.json")
}

pub fn archive_dir(data_dir: &Path) -> PathBuf {
  data_dir.join("archive")
}

pub fn archive_path(data_dir: &Path, generated_at: DateTime<Utc>) -> PathBuf {
  archive_dir(data_dir).join(format!(
    "c2_feed_{}.json",
    generated_at.format("%Y-%m-%d_%H%M")
  ))
}

pub fn logs_dir(data_dir: &Path) -> PathBuf {
  data_dir.join("logs")
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn archive_name_is_minute_stamped() {
    let at = Utc.with_ymd_and_hms(2026, 3, 7, 14, 5, 59).unwrap();
    let p = archive_path(Path::new("data"), at);
    assert_eq!(p, PathBuf::from("data/archive/c2_feed_2026-03-07_1405.json"));
  }
}
